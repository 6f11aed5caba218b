/// Which part of the main screen receives keys when no dialog is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    /// Search input in the header
    Search,
    /// Contact table
    List,
}

impl Pane {
    pub fn title(self) -> &'static str {
        match self {
            Pane::Search => "SEARCH",
            Pane::List => "CONTACTS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles() {
        assert_eq!(Pane::Search.title(), "SEARCH");
        assert_eq!(Pane::List.title(), "CONTACTS");
    }
}
