//! Projects tasks can be filed under.
//!
//! The project list is fetched once per page load and is read-only here;
//! the form refers to a project by its id in textual form.

use serde::Deserialize;

/// A project as listed by `GET /projects/projects/`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_username: Option<String>,
}

impl Project {
    /// The id as the form stores it.
    pub fn form_value(&self) -> String {
        self.id.to_string()
    }
}

/// Find the project a form value refers to.
pub fn find_project<'a>(projects: &'a [Project], form_value: &str) -> Option<&'a Project> {
    let id = form_value.trim().parse::<u64>().ok()?;
    projects.iter().find(|p| p.id == id)
}
