//! Lookup options and contextual scope flags

use bitflags::bitflags;

bitflags! {
    /// Restrictions applied to a single lookup.
    ///
    /// The empty set is an ordinary name lookup.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LookupOptions: u32 {
        /// Only namespaces and types are viable
        const NAMESPACES_OR_TYPES_ONLY = 1 << 0;
        /// Only extern aliases and using aliases are considered, as for `A::B`
        const NAMESPACE_ALIASES_ONLY = 1 << 1;
        /// Members must be invocable; locals are not affected
        const MUST_BE_INVOCABLE_IF_MEMBER = 1 << 2;
        const MUST_BE_INSTANCE = 1 << 3;
        const MUST_NOT_BE_INSTANCE = 1 << 4;
        const MUST_NOT_BE_NAMESPACE = 1 << 5;
        /// Any method arity is acceptable when no type arguments are given
        const ALL_METHODS_ON_ARITY_ZERO = 1 << 6;
        /// Only labels are considered
        const LABELS_ONLY = 1 << 7;
        /// Protected access is checked against the base type instead of the receiver
        const USE_BASE_REFERENCE_ACCESSIBILITY = 1 << 8;
        const INCLUDE_EXTENSION_METHODS = 1 << 9;
        /// Look up `Name` and `NameAttribute`, keeping only attribute classes
        const ATTRIBUTE_TYPE_ONLY = 1 << 10 | Self::NAMESPACES_OR_TYPES_ONLY.bits();
        /// Attribute lookup without the `Attribute` suffix
        const VERBATIM_ATTRIBUTE_NAME = 1 << 11;
        /// Method type parameters are skipped, as inside a cref or a method's own signature
        const MUST_NOT_BE_METHOD_TYPE_PARAMETER = 1 << 12;
        /// Any type arity is acceptable when no type arguments are given
        const ALL_NAMED_TYPES_ON_ARITY_ZERO = 1 << 13;
    }
}

impl LookupOptions {
    /// Whether this combination of options is meaningful
    pub fn are_valid(self) -> bool {
        if self.is_empty() {
            return true;
        }
        if self.contains(Self::LABELS_ONLY) {
            return self == Self::LABELS_ONLY;
        }
        if self.contains(Self::MUST_BE_INSTANCE | Self::MUST_NOT_BE_INSTANCE) {
            return false;
        }
        if self.contains(Self::NAMESPACES_OR_TYPES_ONLY)
            && self.intersects(
                Self::MUST_BE_INVOCABLE_IF_MEMBER
                    | Self::MUST_BE_INSTANCE
                    | Self::MUST_NOT_BE_INSTANCE
                    | Self::MUST_NOT_BE_NAMESPACE,
            )
        {
            return false;
        }
        if self.contains(Self::VERBATIM_ATTRIBUTE_NAME) && !self.is_attribute_type_lookup() {
            return false;
        }
        !self.contains(Self::NAMESPACE_ALIASES_ONLY)
            || (self - Self::NAMESPACE_ALIASES_ONLY - Self::NAMESPACES_OR_TYPES_ONLY).is_empty()
    }

    pub fn is_attribute_type_lookup(self) -> bool {
        self.contains(Self::ATTRIBUTE_TYPE_ONLY)
    }

    pub fn is_verbatim_attribute_lookup(self) -> bool {
        self.contains(Self::VERBATIM_ATTRIBUTE_NAME)
    }

    /// Type and namespace members may contribute
    pub fn can_consider_members(self) -> bool {
        !self.intersects(Self::NAMESPACE_ALIASES_ONLY | Self::LABELS_ONLY)
    }

    /// Locals, parameters and other body declarations may contribute
    pub fn can_consider_locals(self) -> bool {
        !self.intersects(Self::NAMESPACE_ALIASES_ONLY)
    }

    pub fn can_consider_types(self) -> bool {
        !self.intersects(
            Self::MUST_BE_INVOCABLE_IF_MEMBER | Self::MUST_BE_INSTANCE | Self::LABELS_ONLY,
        )
    }

    pub fn can_consider_namespaces(self) -> bool {
        !self.intersects(
            Self::NAMESPACE_ALIASES_ONLY
                | Self::MUST_NOT_BE_NAMESPACE
                | Self::MUST_BE_INVOCABLE_IF_MEMBER
                | Self::MUST_BE_INSTANCE
                | Self::LABELS_ONLY,
        )
    }
}

bitflags! {
    /// Context a scope node was created in, inherited by nested nodes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BinderFlags: u32 {
        const UNSAFE_REGION = 1 << 0;
        const IN_FINALLY_BLOCK = 1 << 1;
        const IN_CATCH_BLOCK = 1 << 2;
        const IN_CATCH_FILTER = 1 << 3;
        const EARLY_ATTRIBUTE_BINDING = 1 << 4;
        const FIELD_INITIALIZER = 1 << 5;
        const IN_CREF = 1 << 6;
        const CHECKED_REGION = 1 << 7;
        const UNCHECKED_REGION = 1 << 8;
        const ATTRIBUTE_ARGUMENTS = 1 << 9;
        const PARAMETER_DEFAULT_VALUE = 1 << 10;
    }
}

impl BinderFlags {
    /// Entering a checked or unchecked region replaces the enclosing one
    #[must_use]
    pub fn with_overflow_checks(self, checked: bool) -> Self {
        let cleared = self - Self::CHECKED_REGION - Self::UNCHECKED_REGION;
        if checked {
            cleared | Self::CHECKED_REGION
        } else {
            cleared | Self::UNCHECKED_REGION
        }
    }
}
