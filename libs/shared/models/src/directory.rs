/// Something listed in a directory screen that can be found by free text.
pub trait Searchable {
    /// The text fields a query is matched against.
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Case-insensitive substring filter. Keeps input order.
pub fn filter<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    items.iter().filter(|item| item.matches(query)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Entry {
        name: &'static str,
        phone: &'static str,
    }

    impl Searchable for Entry {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.name, self.phone]
        }
    }

    fn entries() -> Vec<Entry> {
        vec![
            Entry { name: "John Doe", phone: "9876543210" },
            Entry { name: "Jane Smith", phone: "9876543211" },
            Entry { name: "Bob Johnson", phone: "9876543213" },
        ]
    }

    #[test]
    fn test_case_insensitive_substring() {
        let items = entries();
        let found = filter(&items, "jan");
        assert_eq!(found, vec![&items[1]]);
    }

    #[test]
    fn test_any_field_matches_and_order_is_kept() {
        let items = entries();
        let found = filter(&items, "JOHN");
        assert_eq!(found, vec![&items[0], &items[2]]);

        let by_phone = filter(&items, "3211");
        assert_eq!(by_phone, vec![&items[1]]);
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let items = entries();
        assert_eq!(filter(&items, "").len(), 3);
        assert!(filter(&items, "zzz").is_empty());
    }

    #[test]
    fn test_whitespace_is_part_of_the_query() {
        let items = entries();
        assert!(filter(&items, "doe ").is_empty());
        assert_eq!(filter(&items, "e s"), vec![&items[1]]);

        let mixed = vec![
            Entry { name: "Cher", phone: "9876543214" },
            Entry { name: "Jane Smith", phone: "9876543211" },
        ];
        assert_eq!(filter(&mixed, " "), vec![&mixed[1]]);
    }
}
