#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Unfocused,
    Focused(usize),
}

impl Focus {
    pub fn index(self) -> Option<usize> {
        match self {
            Focus::Unfocused => None,
            Focus::Focused(index) => Some(index),
        }
    }

    pub fn is_focused(self) -> bool {
        matches!(self, Focus::Focused(_))
    }

    pub fn clamp(self, len: usize) -> Self {
        match self {
            Focus::Focused(_) if len == 0 => Focus::Unfocused,
            Focus::Focused(index) => Focus::Focused(index.min(len - 1)),
            Focus::Unfocused => Focus::Unfocused,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Forward,
    Backward,
    Open,
    Escape,
}

impl NavKey {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'k' => Some(NavKey::Forward),
            'j' => Some(NavKey::Backward),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEffect {
    Open(usize),
    Dismiss,
}

pub fn transition(focus: Focus, key: NavKey, len: usize) -> (Focus, Option<NavEffect>) {
    let focus = focus.clamp(len);
    match key {
        NavKey::Forward => {
            if len == 0 {
                return (focus, None);
            }
            let next = match focus {
                Focus::Unfocused => 0,
                Focus::Focused(index) => (index + 1).min(len - 1),
            };
            (Focus::Focused(next), None)
        }
        NavKey::Backward => {
            if len == 0 {
                return (focus, None);
            }
            let next = match focus {
                Focus::Unfocused => 0,
                Focus::Focused(index) => index.saturating_sub(1),
            };
            (Focus::Focused(next), None)
        }
        NavKey::Open => match focus {
            Focus::Focused(index) => (focus, Some(NavEffect::Open(index))),
            Focus::Unfocused => (focus, None),
        },
        NavKey::Escape => (Focus::Unfocused, Some(NavEffect::Dismiss)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_press_enters_first_card() {
        assert_eq!(transition(Focus::Unfocused, NavKey::Backward, 3).0, Focus::Focused(0));
        assert_eq!(transition(Focus::Unfocused, NavKey::Forward, 3).0, Focus::Focused(0));
    }

    #[test]
    fn clamps_without_wrapping() {
        assert_eq!(transition(Focus::Focused(2), NavKey::Forward, 3).0, Focus::Focused(2));
        assert_eq!(transition(Focus::Focused(0), NavKey::Backward, 3).0, Focus::Focused(0));
        assert_eq!(transition(Focus::Focused(1), NavKey::Forward, 3).0, Focus::Focused(2));
    }

    #[test]
    fn empty_page_ignores_movement() {
        assert_eq!(transition(Focus::Unfocused, NavKey::Forward, 0).0, Focus::Unfocused);
        assert_eq!(transition(Focus::Focused(4), NavKey::Backward, 0).0, Focus::Unfocused);
    }

    #[test]
    fn enter_opens_only_when_focused() {
        assert_eq!(
            transition(Focus::Focused(1), NavKey::Open, 3),
            (Focus::Focused(1), Some(NavEffect::Open(1)))
        );
        assert_eq!(transition(Focus::Unfocused, NavKey::Open, 3), (Focus::Unfocused, None));
    }

    #[test]
    fn escape_always_unfocuses() {
        assert_eq!(
            transition(Focus::Focused(2), NavKey::Escape, 3),
            (Focus::Unfocused, Some(NavEffect::Dismiss))
        );
        assert_eq!(transition(Focus::Unfocused, NavKey::Escape, 0).0, Focus::Unfocused);
    }

    fn arb_key() -> impl Strategy<Value = NavKey> {
        prop_oneof![
            Just(NavKey::Forward),
            Just(NavKey::Backward),
            Just(NavKey::Open),
            Just(NavKey::Escape),
        ]
    }

    proptest! {
        #[test]
        fn focus_stays_on_the_page(len in 0usize..13, keys in prop::collection::vec(arb_key(), 0..40)) {
            let mut focus = Focus::Unfocused;
            for key in keys {
                focus = transition(focus, key, len).0;
                if let Some(index) = focus.index() {
                    prop_assert!(index < len);
                }
            }
        }
    }
}
