use crate::editor::{Block, BlockKind, EditorState};
use leptos::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HeadingEntry {
    pub block_id: String,
    pub level: u8,
    pub text: String,
}

/// Headings in document order; blank headings are left out of the outline.
pub(crate) fn derive_headings(blocks: &[Block]) -> Vec<HeadingEntry> {
    blocks
        .iter()
        .filter_map(|b| match b.kind() {
            BlockKind::Heading(level) if !b.plain_text().is_empty() => Some(HeadingEntry {
                block_id: b.id.clone(),
                level,
                text: b.plain_text().to_string(),
            }),
            _ => None,
        })
        .collect()
}

/// The heading the caret is under: the nearest non-blank heading at or before
/// the cursor block.
pub(crate) fn current_heading(blocks: &[Block], cursor: Option<&str>) -> Option<String> {
    let cursor = cursor?;
    let at = blocks.iter().position(|b| b.id == cursor)?;
    blocks[..=at]
        .iter()
        .rev()
        .find(|b| matches!(b.kind(), BlockKind::Heading(_)) && !b.plain_text().is_empty())
        .map(|b| b.id.clone())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HeadingTone {
    Full,
    Faint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HeadingEmphasis {
    pub tone: HeadingTone,
    pub marker: bool,
    pub bold: bool,
}

/// Hover previews the heading (full tone and marker); only the cursor heading
/// is bold.
pub(crate) fn heading_emphasis(is_highlight: bool, is_hover: bool) -> HeadingEmphasis {
    HeadingEmphasis {
        tone: if is_highlight || is_hover {
            HeadingTone::Full
        } else {
            HeadingTone::Faint
        },
        marker: is_highlight || is_hover,
        bold: is_highlight,
    }
}

pub(crate) fn heading_size_class(level: u8) -> &'static str {
    match level {
        1 => "text-[1.2rem]",
        2 => "text-[1rem]",
        _ => "text-[0.8rem]",
    }
}

fn emphasis_class(e: HeadingEmphasis) -> String {
    let tone = match e.tone {
        HeadingTone::Full => "text-primary",
        HeadingTone::Faint => "text-primary/50",
    };
    let marker = if e.marker {
        "shadow-[-2px_0_0_currentColor]"
    } else {
        ""
    };
    let weight = if e.bold { "font-bold" } else { "font-normal" };
    format!("{tone} {marker} {weight}")
}

#[component]
pub fn HeadingItem(
    editor: EditorState,
    heading: HeadingEntry,
    #[prop(into)] is_highlight: Signal<bool>,
) -> impl IntoView {
    let is_hover = RwSignal::new(false);
    let block_id = heading.block_id.clone();
    let size = heading_size_class(heading.level);

    let class = move || {
        format!(
            "block w-full py-0.5 pl-2 text-left transition-all [overflow-wrap:anywhere] {size} {}",
            emphasis_class(heading_emphasis(is_highlight.get(), is_hover.get()))
        )
    };

    view! {
        <button
            type="button"
            class=class
            aria-selected=move || is_highlight.get().to_string()
            on:mouseover=move |_| is_hover.set(true)
            on:mouseleave=move |_| is_hover.set(false)
            on:click=move |_| editor.focus_block(&block_id)
        >
            {heading.text}
        </button>
    }
}

/// Clickable outline of the editor's headings.
#[component]
pub fn TableContent(editor: EditorState) -> impl IntoView {
    let headings = Memo::new(move |_| editor.blocks.with(|b| derive_headings(b)));
    let current = Memo::new(move |_| {
        let cursor = editor.cursor.get();
        editor
            .blocks
            .with(|b| current_heading(b, cursor.as_deref()))
    });

    view! {
        <nav data-name="TableContent" aria-label="Summary" class="flex flex-col gap-1">
            <Show
                when=move || !headings.get().is_empty()
                fallback=|| view! { <div class="text-xs text-muted-foreground">"No headings yet."</div> }
            >
                <div class="text-xs font-semibold uppercase text-muted-foreground">"Summary"</div>
                {move || {
                    headings
                        .get()
                        .into_iter()
                        .map(|h| {
                            let id = h.block_id.clone();
                            let is_highlight = Signal::derive(move || {
                                current.get().as_deref() == Some(id.as_str())
                            });
                            view! { <HeadingItem editor=editor heading=h is_highlight=is_highlight /> }
                        })
                        .collect_view()
                }}
            </Show>
        </nav>
    }
}
