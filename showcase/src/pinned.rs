/// Allow-list of repository names to display. Matching is case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinnedRepoSet {
    names: Vec<String>,
    // Lower-cased copies of `names`, same order.
    folded: Vec<String>,
}

pub const DEFAULT_PINNED_REPOS: &[&str] = &["Expense-Splitter", "CS230-Stock_Price"];

impl PinnedRepoSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let folded = names.iter().map(|name| name.to_lowercase()).collect();

        PinnedRepoSet { names, folded }
    }

    /// Parses a comma-separated list such as `"repo-a, repo-b"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// An empty set lets every repository through.
    pub fn matches(&self, name: &str) -> bool {
        if self.folded.is_empty() {
            return true;
        }
        let name = name.to_lowercase();
        self.folded.iter().any(|pinned| *pinned == name)
    }
}

impl Default for PinnedRepoSet {
    fn default() -> Self {
        Self::new(DEFAULT_PINNED_REPOS)
    }
}
