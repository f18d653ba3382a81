use std::collections::HashMap;

/// Directed site-to-site travel times in minutes.
#[derive(Debug, Clone, Default)]
pub struct TravelTimeMatrix {
    minutes: HashMap<(String, String), f64>,
}

impl TravelTimeMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from_site: impl Into<String>, to_site: impl Into<String>, minutes: f64) {
        self.minutes.insert((from_site.into(), to_site.into()), minutes);
    }

    /// Travel time from one site to another; a site is zero minutes from itself.
    pub fn minutes(&self, from_site: &str, to_site: &str) -> Option<f64> {
        if from_site == to_site {
            return Some(0.0);
        }
        self.minutes
            .get(&(from_site.to_string(), to_site.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.minutes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minutes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_directed() {
        let mut m = TravelTimeMatrix::new();
        m.insert("A", "B", 7.0);
        assert_eq!(m.minutes("A", "B"), Some(7.0));
        assert_eq!(m.minutes("B", "A"), None);
        assert_eq!(m.minutes("B", "B"), Some(0.0));
    }
}
