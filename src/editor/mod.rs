use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Deepest heading level rendered in the outline.
pub(crate) const MAX_HEADING_LEVEL: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BlockKind {
    Paragraph,
    Heading(u8),
}

/// One line of the document. Headings use a markdown prefix (`# `, `## `, `### `).
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Block {
    pub id: String,
    pub text: String,
}

impl Block {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match split_heading(&self.text) {
            Some((level, _)) => BlockKind::Heading(level),
            None => BlockKind::Paragraph,
        }
    }

    /// Text without the heading marker.
    pub fn plain_text(&self) -> &str {
        split_heading(&self.text).map_or(self.text.as_str(), |(_, rest)| rest)
    }
}

fn split_heading(text: &str) -> Option<(u8, &str)> {
    let hashes = text.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > MAX_HEADING_LEVEL as usize {
        return None;
    }
    let rest = text[hashes..].strip_prefix(' ')?;
    Some((hashes as u8, rest.trim()))
}

pub(crate) fn block_id(n: u64) -> String {
    format!("block-{n}")
}

/// Splits document content into one block per line. Never returns an empty list.
pub(crate) fn parse_blocks(content: &str) -> Vec<Block> {
    parse_blocks_from(content, 0)
}

/// Like `parse_blocks`, numbering block ids from `first_id`.
pub(crate) fn parse_blocks_from(content: &str, first_id: u64) -> Vec<Block> {
    let mut blocks: Vec<Block> = content
        .lines()
        .enumerate()
        .map(|(i, line)| Block::new(block_id(first_id + i as u64), line.trim_end()))
        .collect();
    if blocks.is_empty() {
        blocks.push(Block::new(block_id(first_id), ""));
    }
    blocks
}

/// Live editor content and caret position, provided to the outline.
#[derive(Clone, Copy)]
pub(crate) struct EditorState {
    pub blocks: RwSignal<Vec<Block>>,
    /// Block holding the caret.
    pub cursor: RwSignal<Option<String>>,
    next_id: RwSignal<u64>,
}

impl EditorState {
    pub fn new(content: &str) -> Self {
        let blocks = parse_blocks(content);
        let next_id = blocks.len() as u64;
        Self {
            blocks: RwSignal::new(blocks),
            cursor: RwSignal::new(None),
            next_id: RwSignal::new(next_id),
        }
    }

    /// Swaps in new content. Blocks get fresh ids so their textareas are rebuilt.
    pub fn replace_content(&self, content: &str) {
        let first_id = self.next_id.get_untracked();
        let blocks = parse_blocks_from(content, first_id);
        self.next_id.set(first_id + blocks.len() as u64);
        self.blocks.set(blocks);
        self.cursor.set(None);
    }

    fn set_text(&self, id: &str, text: String) {
        self.blocks.update(|blocks| {
            if let Some(b) = blocks.iter_mut().find(|b| b.id == id) {
                b.text = text;
            }
        });
    }

    fn insert_after(&self, id: &str) -> String {
        let mut n = 0;
        self.next_id.update(|v| {
            n = *v;
            *v += 1;
        });
        let new_id = block_id(n);
        let block = Block::new(new_id.clone(), "");
        self.blocks.update(|blocks| {
            let at = blocks.iter().position(|b| b.id == id).map_or(blocks.len(), |i| i + 1);
            blocks.insert(at, block);
        });
        new_id
    }

    /// Removes an empty block and returns the id of the block before it.
    fn remove_empty(&self, id: &str) -> Option<String> {
        let mut previous = None;
        self.blocks.update(|blocks| {
            let Some(i) = blocks.iter().position(|b| b.id == id) else {
                return;
            };
            if i == 0 || !blocks[i].text.is_empty() {
                return;
            }
            blocks.remove(i);
            previous = Some(blocks[i - 1].id.clone());
        });
        previous
    }

    /// Puts the caret at the end of `id` and brings it into view.
    pub fn focus_block(&self, id: &str) {
        self.cursor.set(Some(id.to_string()));
        focus_block_end(id);
        scroll_block_into_view(id);
    }
}

pub(crate) fn block_selector(id: &str) -> String {
    format!("[data-id=\"{id}\"]")
}

fn find_block_element(id: &str) -> Option<web_sys::Element> {
    let document = web_sys::window()?.document()?;
    document.query_selector(&block_selector(id)).ok().flatten()
}

/// Focuses the block's textarea with the caret after its last character.
pub(crate) fn focus_block_end(id: &str) -> bool {
    let Some(el) = find_block_element(id)
        .and_then(|el| el.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
    else {
        return false;
    };

    let _ = el.focus();
    // selectionStart/End are in UTF-16 code units.
    let len = el.value().encode_utf16().count() as u32;
    let _ = el.set_selection_range(len, len);
    true
}

pub(crate) fn scroll_block_into_view(id: &str) {
    if let Some(el) = find_block_element(id) {
        let opts = web_sys::ScrollIntoViewOptions::new();
        opts.set_behavior(web_sys::ScrollBehavior::Smooth);
        opts.set_block(web_sys::ScrollLogicalPosition::Start);
        el.scroll_into_view_with_scroll_into_view_options(&opts);
    }
}

/// Focus on the next tick so a freshly inserted block is mounted.
fn focus_block_later(id: String) {
    if let Some(window) = web_sys::window() {
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            wasm_bindgen::closure::Closure::once_into_js(move || {
                focus_block_end(&id);
            })
            .as_ref()
            .unchecked_ref(),
            0,
        );
    }
}

fn block_class(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Heading(1) => "text-2xl font-bold",
        BlockKind::Heading(2) => "text-xl font-semibold",
        BlockKind::Heading(_) => "text-lg font-semibold",
        BlockKind::Paragraph => "text-sm",
    }
}

#[component]
pub fn DocEditor(state: EditorState) -> impl IntoView {
    // Keyed by block id: typing must not rebuild the textareas.
    view! {
        <div data-name="DocEditor" class="flex flex-col gap-1">
            <For
                each=move || state.blocks.get()
                key=|block| block.id.clone()
                children=move |block: Block| {
                    let id = block.id.clone();

                    let class_id = id.clone();
                    let class = move || {
                        let kind = state
                            .blocks
                            .with(|blocks| blocks.iter().find(|b| b.id == class_id).map(Block::kind))
                            .unwrap_or(BlockKind::Paragraph);
                        format!(
                            "w-full resize-none bg-transparent px-1 outline-none {}",
                            block_class(kind),
                        )
                    };

                    let focus_id = id.clone();
                    let input_id = id.clone();
                    let key_id = id.clone();
                    view! {
                        <textarea
                            data-id=id
                            rows="1"
                            class=class
                            prop:value=block.text
                            on:focus=move |_| state.cursor.set(Some(focus_id.clone()))
                            on:input=move |ev| {
                                if let Some(el) = ev
                                    .target()
                                    .and_then(|t| t.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
                                {
                                    state.set_text(&input_id, el.value());
                                }
                            }
                            on:keydown=move |ev: web_sys::KeyboardEvent| {
                                match ev.key().as_str() {
                                    "Enter" if !ev.shift_key() => {
                                        ev.prevent_default();
                                        let new_id = state.insert_after(&key_id);
                                        state.cursor.set(Some(new_id.clone()));
                                        focus_block_later(new_id);
                                    }
                                    "Backspace" => {
                                        if let Some(prev) = state.remove_empty(&key_id) {
                                            ev.prevent_default();
                                            state.cursor.set(Some(prev.clone()));
                                            focus_block_later(prev);
                                        }
                                    }
                                    _ => {}
                                }
                            }
                        />
                    }
                }
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_prefixes() {
        assert_eq!(Block::new("a", "# Title").kind(), BlockKind::Heading(1));
        assert_eq!(Block::new("a", "### Deep").kind(), BlockKind::Heading(3));
        assert_eq!(Block::new("a", "#### Too deep").kind(), BlockKind::Paragraph);
        assert_eq!(Block::new("a", "#NoSpace").kind(), BlockKind::Paragraph);
        assert_eq!(Block::new("a", "plain").kind(), BlockKind::Paragraph);
    }

    #[test]
    fn test_plain_text_strips_marker() {
        assert_eq!(Block::new("a", "## Goals  ").plain_text(), "Goals");
        assert_eq!(Block::new("a", "body").plain_text(), "body");
    }

    #[test]
    fn test_parse_blocks_one_per_line() {
        let blocks = parse_blocks("# Intro\ntext\n\n## Next");
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].id, "block-0");
        assert_eq!(blocks[3].kind(), BlockKind::Heading(2));
        assert_eq!(blocks[2].text, "");
    }

    #[test]
    fn test_parse_blocks_never_empty() {
        let blocks = parse_blocks("");
        assert_eq!(blocks, vec![Block::new("block-0", "")]);
    }

    #[test]
    fn test_parse_blocks_from_offsets_ids() {
        let blocks = parse_blocks_from("a\nb", 7);
        assert_eq!(blocks[0].id, "block-7");
        assert_eq!(blocks[1].id, "block-8");
    }

    #[test]
    fn test_block_selector() {
        assert_eq!(block_selector("block-3"), "[data-id=\"block-3\"]");
    }
}
