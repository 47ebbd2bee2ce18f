//! Which screen the page shows.
//!
//! [`current_view`] is a pure function of the page state. The screens are
//! mutually exclusive and chosen in a fixed precedence: loading, error,
//! not found, then the form.

use crate::page::AssignTaskPage;
use crate::project::Project;
use crate::task::TaskDraft;
use crate::user::UserRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    Loading,
    /// Load failed; offers a way back to the team overview.
    Error { message: &'a str },
    /// Loaded without a target user; offers a way back to the team overview.
    NotFound,
    Form {
        /// Inline, non-fatal error shown above the form.
        banner: Option<&'a str>,
        target_user: &'a UserRecord,
        projects: &'a [Project],
        draft: &'a TaskDraft,
    },
}

/// Select the view for `(loading, error, target_user, projects, draft)`.
pub fn select_view<'a>(
    loading: bool,
    error: Option<&'a str>,
    target_user: Option<&'a UserRecord>,
    projects: &'a [Project],
    draft: &'a TaskDraft,
) -> View<'a> {
    if loading {
        return View::Loading;
    }
    if let Some(message) = error.filter(|m| !m.is_empty()) {
        return View::Error { message };
    }
    match target_user {
        None => View::NotFound,
        Some(target_user) => View::Form { banner: error, target_user, projects, draft },
    }
}

pub fn current_view(page: &AssignTaskPage) -> View<'_> {
    select_view(page.is_loading(), page.error(), page.target_user(), page.projects(), page.draft())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{LoadError, LoadedPage};
    use crate::testing::{project, user};

    #[test]
    fn test_precedence() {
        let draft = TaskDraft::new();
        let target = user(42, "dev");
        let projects = vec![project(1, "Alpha")];

        assert_eq!(select_view(true, Some("boom"), Some(&target), &projects, &draft), View::Loading);
        assert_eq!(
            select_view(false, Some("boom"), Some(&target), &projects, &draft),
            View::Error { message: "boom" }
        );
        assert_eq!(select_view(false, None, None, &projects, &draft), View::NotFound);
        assert_eq!(
            select_view(false, None, Some(&target), &projects, &draft),
            View::Form { banner: None, target_user: &target, projects: &projects, draft: &draft }
        );
    }

    #[test]
    fn test_empty_error_is_not_an_error() {
        let draft = TaskDraft::new();
        let target = user(42, "dev");
        assert!(matches!(
            select_view(false, Some(""), Some(&target), &[], &draft),
            View::Form { banner: Some(""), .. }
        ));
    }

    #[test]
    fn test_follows_page_lifecycle() {
        let (mut page, ticket) = AssignTaskPage::new("42");
        assert_eq!(current_view(&page), View::Loading);

        page.finish_load(ticket.generation, Err(LoadError::NoProjects));
        assert_eq!(current_view(&page), View::Error { message: "No projects found" });

        let ticket = page.set_route("43").unwrap();
        assert_eq!(current_view(&page), View::Loading);

        page.finish_load(ticket.generation, Ok(LoadedPage { target_user: user(43, "qa"), projects: vec![] }));
        assert!(matches!(current_view(&page), View::Form { target_user, .. } if target_user.id == 43));
    }
}
