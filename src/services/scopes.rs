/*
 * Responsibility
 * - scope / claim 識別子 → 表示名・説明 の静的テーブル
 * - 完全一致の lookup のみ。無いキーは None (エラーではない)
 */
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeDisplay {
    pub display_name: &'static str,
    pub description: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct ScopeCatalog {
    entries: HashMap<&'static str, ScopeDisplay>,
}

impl ScopeCatalog {
    /// The standard identity scopes.
    pub fn standard() -> Self {
        let entries = [
            ("openid", "Your user identifier", None),
            (
                "profile",
                "User profile",
                Some("Your user profile information (first name, last name, etc.)"),
            ),
            ("email", "Your email address", None),
            ("address", "Your postal address", None),
            ("phone", "Your phone number", None),
            ("offline_access", "Offline access", None),
            ("roles", "User roles", None),
            ("all_claims", "All user information", None),
        ];

        Self {
            entries: entries
                .into_iter()
                .map(|(key, display_name, description)| {
                    (
                        key,
                        ScopeDisplay {
                            display_name,
                            description,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn lookup(&self, scope: &str) -> Option<&ScopeDisplay> {
        self.entries.get(scope)
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.entries.contains_key(scope)
    }
}

impl Default for ScopeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
