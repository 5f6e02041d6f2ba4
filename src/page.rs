//! Query parameters consumed by the site's pages.

use reqwest::Url;

use crate::error::{DalilError, Result};

/// Parameters read from a page URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Algorithm to show on the detail page
    pub id: Option<String>,
    /// Which form redirected here after submitting
    pub form: Option<String>,
    pub success: bool,
}

impl PageQuery {
    /// Parse the query string of `url`. Empty values count as absent.
    pub fn parse(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| DalilError::InvalidUrl(e.to_string()))?;
        let mut query = PageQuery::default();

        for (key, value) in url.query_pairs() {
            let value = value.trim();
            match key.as_ref() {
                "id" if !value.is_empty() => query.id = Some(value.to_string()),
                "form" if !value.is_empty() => query.form = Some(value.to_string()),
                "success" => query.success = value == "true",
                _ => {}
            }
        }

        Ok(query)
    }

    /// The form to thank, when the page was reached by a successful
    /// post-submission redirect.
    pub fn success_banner(&self) -> Option<&str> {
        if self.success {
            self.form.as_deref()
        } else {
            None
        }
    }
}
