use crate::{barcode::Barcode, index::RelationIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Child,
    Parent,
}

/// Where a barcode sits in the catalog's family graph.
///
/// `family` is always the parent barcode the record resolves to through the
/// child side of the index. A parent's own family is its own barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Unrelated,
    Parent,
    Child { family: Barcode },
    /// Case of one family and unit of another (multi-level packaging).
    Both { family: Barcode },
}

impl Classification {
    pub fn is_related(&self) -> bool {
        !matches!(self, Classification::Unrelated)
    }

    /// Every (role, family id) pair the record is routed to, parent first.
    pub fn assignments<'a>(
        &'a self,
        own: &'a Barcode,
    ) -> impl Iterator<Item = (Role, &'a Barcode)> + 'a {
        let as_parent = matches!(self, Classification::Parent | Classification::Both { .. })
            .then_some((Role::Parent, own));
        let as_child = match self {
            Classification::Child { family } | Classification::Both { family } => {
                Some((Role::Child, family))
            }
            _ => None,
        };
        as_parent.into_iter().chain(as_child)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::Unrelated => "unrelated",
            Classification::Parent => "parent",
            Classification::Child { .. } => "child",
            Classification::Both { .. } => "parent+child",
        }
    }
}

pub fn classify(barcode: &Barcode, index: &RelationIndex) -> Classification {
    let is_parent = index.is_parent(barcode);
    match (is_parent, index.parent_of(barcode)) {
        (false, None) => Classification::Unrelated,
        (true, None) => Classification::Parent,
        (false, Some(parent)) => Classification::Child {
            family: parent.clone(),
        },
        (true, Some(parent)) => Classification::Both {
            family: parent.clone(),
        },
    }
}
