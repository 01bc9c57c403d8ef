use std::collections::HashMap;

/// Read/write access to the domain records. Handlers take the store as an
/// explicit dependency so they can be exercised against any implementation.
pub trait RecordStore {
    fn resolve(&self, domain: &str) -> Option<String>;

    fn register(&mut self, domain: String, address: String);
}

/// Exact-match in-memory store. Keys are full decoded names, scheme prefix
/// included; re-registering a domain overwrites it. No expiry.
#[derive(Debug, Default)]
pub struct Registry {
    records: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the records the service ships with.
    pub fn seeded() -> Self {
        let records = [
            ("https://www.google.com", "172.217.1.110"),
            ("https://www.yahoo.com", "74.6.231.21"),
            ("https://www.nhl.com", "104.18.17.236"),
            ("https://www.python.org", "151.101.193.168"),
        ]
        .into_iter()
        .map(|(domain, address)| (domain.to_owned(), address.to_owned()))
        .collect();

        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for Registry {
    fn resolve(&self, domain: &str) -> Option<String> {
        self.records.get(domain).cloned()
    }

    fn register(&mut self, domain: String, address: String) {
        self.records.insert(domain, address);
    }
}
