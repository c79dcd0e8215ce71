use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::DomainId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DomainError {
    #[error("domain name cannot be empty")]
    EmptyName,

    #[error("exam weight must be a percentage in 0..=100, got {0}")]
    InvalidWeight(u8),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate domain id: {0}")]
    DuplicateDomain(DomainId),
}

//
// ─── DOMAIN ────────────────────────────────────────────────────────────────────
//

/// A topical category of questions with fixed display metadata.
///
/// Reference data supplied by the host's data provider; the engine only ever
/// reads it. Icon, color and gradient are opaque presentation tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    id: DomainId,
    name: String,
    icon: String,
    color: String,
    gradient: String,
    weight: u8,
}

impl Domain {
    /// Creates a new `Domain`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyName` if the name is empty or
    /// whitespace-only, and `DomainError::InvalidWeight` if the exam weight
    /// exceeds 100 percent.
    pub fn new(
        id: DomainId,
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        gradient: impl Into<String>,
        weight: u8,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::EmptyName);
        }
        if weight > 100 {
            return Err(DomainError::InvalidWeight(weight));
        }

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            icon: icon.into(),
            color: color.into(),
            gradient: gradient.into(),
            weight,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &DomainId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn gradient(&self) -> &str {
        &self.gradient
    }

    /// Share of the certification exam covered by this domain, in percent.
    #[must_use]
    pub fn weight(&self) -> u8 {
        self.weight
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Ordered collection of domains as handed over by the reference-data
/// provider.
///
/// Preserves provider order so selection screens render domains in the same
/// sequence the exam guide lists them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainCatalog {
    domains: Vec<Domain>,
}

impl DomainCatalog {
    /// Builds a catalog from an ordered list of domains.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateDomain` if two domains share an id.
    pub fn new(domains: Vec<Domain>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for domain in &domains {
            if !seen.insert(domain.id().clone()) {
                return Err(CatalogError::DuplicateDomain(domain.id().clone()));
            }
        }
        Ok(Self { domains })
    }

    /// Looks up a domain by id.
    #[must_use]
    pub fn get(&self, id: &DomainId) -> Option<&Domain> {
        self.domains.iter().find(|domain| domain.id() == id)
    }

    /// All domains in provider order.
    #[must_use]
    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
