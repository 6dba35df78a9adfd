mod list;
mod panel;

pub use list::PadList;
pub use panel::Panel;

use crate::models::Pad;

pub(crate) const PADS_EMPTY_TEXT: &str =
    r#"Create your first pad by clicking on the "Create a new pad" button."#;

/// Icon shown next to a pad. A pad nobody else was invited to reads as empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PadIconVariant {
    Empty,
    Populated,
}

impl PadIconVariant {
    pub fn for_pad(pad: &Pad) -> Self {
        if pad.accesses.len() <= 1 {
            Self::Empty
        } else {
            Self::Populated
        }
    }

    pub fn aria_label(self) -> &'static str {
        match self {
            Self::Empty => "Empty pads icon",
            Self::Populated => "Pads icon",
        }
    }
}

pub(crate) fn panel_toggle_label(open: bool) -> &'static str {
    if open {
        "Close the pads panel"
    } else {
        "Open the pads panel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PadAccess, Role};

    fn pad(accesses: usize) -> Pad {
        Pad {
            id: "1".to_string(),
            name: "Team 1".to_string(),
            accesses: (0..accesses)
                .map(|i| PadAccess {
                    id: i.to_string(),
                    role: Role::Owner,
                })
                .collect(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_single_member_pads_look_empty() {
        assert_eq!(PadIconVariant::for_pad(&pad(0)), PadIconVariant::Empty);
        assert_eq!(PadIconVariant::for_pad(&pad(1)), PadIconVariant::Empty);
        assert_eq!(PadIconVariant::for_pad(&pad(2)), PadIconVariant::Populated);
        assert_eq!(PadIconVariant::Empty.aria_label(), "Empty pads icon");
        assert_eq!(PadIconVariant::Populated.aria_label(), "Pads icon");
    }

    #[test]
    fn test_panel_toggle_label() {
        assert_eq!(panel_toggle_label(true), "Close the pads panel");
        assert_eq!(panel_toggle_label(false), "Open the pads panel");
    }
}
