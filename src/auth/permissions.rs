//! Section-level access control.
//!
//! The portal is organised into sections, and each role can reach a fixed
//! subset of them. A section outside the caller's reach answers exactly like
//! a nonexistent route, so probing cannot distinguish "forbidden" from
//! "does not exist".

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::models::users::{CurrentUser, Role},
    errors::{Error, Result},
};

/// Portal sections a session can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Dashboard,
    Residents,
    Structure,
    Reservations,
    Visitors,
    Packages,
    Communications,
    Finance,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Residents => "residents",
            Section::Structure => "structure",
            Section::Reservations => "reservations",
            Section::Visitors => "visitors",
            Section::Packages => "packages",
            Section::Communications => "communications",
            Section::Finance => "finance",
        }
    }
}

const ALL_SECTIONS: [Section; 8] = [
    Section::Dashboard,
    Section::Residents,
    Section::Structure,
    Section::Reservations,
    Section::Visitors,
    Section::Packages,
    Section::Communications,
    Section::Finance,
];

/// The sections a role can reach.
///
/// Managers see everything. Doormen run the front desk, so they lose the
/// administrative sections (structure and finance). Residents have no portal
/// login at all.
pub fn reachable_sections(role: Role) -> Vec<Section> {
    match role {
        Role::Sindico => ALL_SECTIONS.to_vec(),
        Role::Porteiro => ALL_SECTIONS
            .into_iter()
            .filter(|s| !matches!(s, Section::Structure | Section::Finance))
            .collect(),
        Role::Morador => Vec::new(),
    }
}

/// Guard a handler behind a section.
///
/// Fails with a 404-shaped error when the section is out of reach.
pub fn require_section(user: &CurrentUser, section: Section) -> Result<()> {
    if reachable_sections(user.role).contains(&section) {
        Ok(())
    } else {
        Err(Error::SectionNotFound {
            section: section.as_str().to_string(),
        })
    }
}

/// Guard a manager-only operation inside a section both roles can reach.
///
/// Answers like [`require_section`]: a restricted operation is
/// indistinguishable from a missing route.
pub fn require_manager(user: &CurrentUser, section: Section) -> Result<()> {
    require_section(user, section)?;
    if user.role.is_manager() {
        Ok(())
    } else {
        Err(Error::SectionNotFound {
            section: section.as_str().to_string(),
        })
    }
}
