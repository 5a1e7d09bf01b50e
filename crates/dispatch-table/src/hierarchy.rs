//! Class hierarchy (component C2, an external collaborator).
//!
//! Provides super-first iteration of classes, the dense class-id numbering
//! every concrete class already carries, and each class's instance-member
//! list.

use dispatch_types::ClassId;

/// One class in the closed-world hierarchy.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub class_id: ClassId,
    /// `None` for the root class.
    pub super_id: Option<ClassId>,
    /// True for the special low-level base class, whose members are never
    /// indexed for dynamic dispatch.
    pub is_low_level_base: bool,
    /// True if this class has no concrete instances (purely abstract).
    pub is_abstract: bool,
    /// Members declared directly on this class (not inherited).
    pub members: Vec<crate::metadata::MemberDecl>,
}

impl ClassInfo {
    pub fn new(class_id: ClassId, super_id: Option<ClassId>) -> Self {
        Self {
            class_id,
            super_id,
            is_low_level_base: false,
            is_abstract: false,
            members: Vec::new(),
        }
    }
}

/// The closed-world class hierarchy, super-first.
///
/// `classes` must be ordered so that every class appears after its
/// superclass (super-first iteration, per the class-id numbering contract).
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
    classes: Vec<ClassInfo>,
    max_concrete_class_id: u32,
}

impl ClassHierarchy {
    pub fn new(classes: Vec<ClassInfo>, max_concrete_class_id: u32) -> Self {
        Self {
            classes,
            max_concrete_class_id,
        }
    }

    /// Iterate classes super-first.
    pub fn iter_super_first(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.iter()
    }

    pub fn max_concrete_class_id(&self) -> u32 {
        self.max_concrete_class_id
    }

    pub fn class(&self, id: ClassId) -> &ClassInfo {
        &self.classes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
