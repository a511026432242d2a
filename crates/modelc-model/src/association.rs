//! Association resolution
//!
//! Associations are not kept in the graph. Each one is turned into concrete
//! properties on its endpoint classes (scalar foreign key, foreign key list or
//! composed child), or rejected with a diagnostic. The decision itself is the
//! pure function [`resolve`]; the reader applies its outcome to the graph.

use crate::graph::Stereotype;
use crate::raw::Composition;

/// Association endpoint cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    /// `0..1`
    ZeroOrOne,

    /// `1..1`
    ExactlyOne,

    /// `0..N`
    ZeroOrMany,

    /// `1..N`
    OneOrMany,
}

impl Multiplicity {
    /// Every legal multiplicity
    pub const ALL: [Multiplicity; 4] = [
        Self::ZeroOrOne,
        Self::ExactlyOne,
        Self::ZeroOrMany,
        Self::OneOrMany,
    ];

    /// Parse a normalised multiplicity (`0..1`, `1..1`, `0..N`, `1..N`)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "0..1" => Some(Self::ZeroOrOne),
            "1..1" => Some(Self::ExactlyOne),
            "0..N" => Some(Self::ZeroOrMany),
            "1..N" => Some(Self::OneOrMany),
            _ => None,
        }
    }

    /// Whether the end holds at most one instance
    pub fn is_single(&self) -> bool {
        matches!(self, Self::ZeroOrOne | Self::ExactlyOne)
    }

    /// Whether the end holds many instances
    pub fn is_many(&self) -> bool {
        !self.is_single()
    }

    /// Whether at least one instance is mandatory
    pub fn is_required(&self) -> bool {
        matches!(self, Self::ExactlyOne | Self::OneOrMany)
    }

    /// Canonical text form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroOrOne => "0..1",
            Self::ExactlyOne => "1..1",
            Self::ZeroOrMany => "0..N",
            Self::OneOrMany => "1..N",
        }
    }
}

impl std::fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One end of an association as seen by the decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndInfo {
    pub stereotype: Stereotype,
    pub is_persistent: bool,
    /// Multiplicity written at this end
    pub multiplicity: Multiplicity,
}

/// Association end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The other end
    pub fn other(&self) -> Side {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Why a direction of an association produces no property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Many-to-many between two persistent classes, no stereotype exception
    ManyToManyBetweenTables,

    /// A persistent class would hold a foreign key to a non-persistent class
    PersistentToTransient,
}

/// Outcome of resolving one association
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// `holder` gets a scalar foreign key to the other end
    ForeignKey { holder: Side, is_required: bool },

    /// `holder` gets a list of foreign keys to the other end
    ForeignKeyList { holder: Side, is_persistent: bool },

    /// `owner` gets a composed-child property typed as the other end
    ComposedChild { owner: Side, is_collection: bool },

    /// `holder` gets nothing; a diagnostic is due
    Rejected { holder: Side, reason: Rejection },
}

/// Stereotype pairs allowed to hold a many-to-many between two tables
///
/// Static to Static, and Reference to anything but Reference. The list is
/// then kept as a non-persistent property.
pub fn many_to_many_exception(source: Stereotype, target: Stereotype) -> bool {
    matches!(
        (source, target),
        (Stereotype::Static, Stereotype::Static)
            | (Stereotype::Reference, Stereotype::None)
            | (Stereotype::Reference, Stereotype::Static)
    )
}

/// Decide which properties an association yields
///
/// Never returns an empty vector: every association either produces at least
/// one property or at least one rejection.
pub fn resolve(a: &EndInfo, b: &EndInfo, composition: Composition) -> Vec<Resolution> {
    match composition {
        Composition::OwnedByA => {
            return vec![Resolution::ComposedChild {
                owner: Side::A,
                is_collection: b.multiplicity.is_many(),
            }];
        }
        Composition::OwnedByB => {
            return vec![Resolution::ComposedChild {
                owner: Side::B,
                is_collection: a.multiplicity.is_many(),
            }];
        }
        Composition::None => {}
    }

    let mut resolutions = Vec::with_capacity(2);

    // A single B per A: A references B
    if b.multiplicity.is_single() {
        resolutions.push(foreign_key(Side::A, a, b));
    }

    // A single A per B: B references A
    if a.multiplicity.is_single() {
        resolutions.push(foreign_key(Side::B, b, a));
    }

    if a.multiplicity.is_many() && b.multiplicity.is_many() {
        resolutions.push(foreign_key_list(a, b));
    }

    resolutions
}

fn foreign_key(holder: Side, holder_end: &EndInfo, target_end: &EndInfo) -> Resolution {
    if holder_end.is_persistent && !target_end.is_persistent {
        return Resolution::Rejected {
            holder,
            reason: Rejection::PersistentToTransient,
        };
    }

    Resolution::ForeignKey {
        holder,
        is_required: target_end.multiplicity == Multiplicity::ExactlyOne,
    }
}

fn foreign_key_list(a: &EndInfo, b: &EndInfo) -> Resolution {
    if !a.is_persistent {
        return Resolution::ForeignKeyList {
            holder: Side::A,
            is_persistent: false,
        };
    }

    if !b.is_persistent {
        return Resolution::Rejected {
            holder: Side::A,
            reason: Rejection::PersistentToTransient,
        };
    }

    if many_to_many_exception(a.stereotype, b.stereotype) {
        Resolution::ForeignKeyList {
            holder: Side::A,
            is_persistent: false,
        }
    } else {
        Resolution::Rejected {
            holder: Side::A,
            reason: Rejection::ManyToManyBetweenTables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end(stereotype: Stereotype, is_persistent: bool, multiplicity: Multiplicity) -> EndInfo {
        EndInfo {
            stereotype,
            is_persistent,
            multiplicity,
        }
    }

    #[test]
    fn multiplicity_parsing() {
        assert_eq!(Multiplicity::parse("0..1"), Some(Multiplicity::ZeroOrOne));
        assert_eq!(Multiplicity::parse(" 1..N "), Some(Multiplicity::OneOrMany));
        assert_eq!(Multiplicity::parse("2..5"), None);
        assert_eq!(Multiplicity::parse("0..*"), None);
    }

    #[test]
    fn many_to_one_gives_foreign_key_on_many_side() {
        let line = end(Stereotype::None, true, Multiplicity::ZeroOrMany);
        let order = end(Stereotype::None, true, Multiplicity::ExactlyOne);

        let resolutions = resolve(&line, &order, Composition::None);
        assert_eq!(
            resolutions,
            vec![Resolution::ForeignKey {
                holder: Side::A,
                is_required: true,
            }]
        );
    }

    #[test]
    fn one_to_one_references_both_ways() {
        let a = end(Stereotype::None, true, Multiplicity::ZeroOrOne);
        let b = end(Stereotype::None, true, Multiplicity::ZeroOrOne);

        let resolutions = resolve(&a, &b, Composition::None);
        assert_eq!(resolutions.len(), 2);
        assert!(resolutions.contains(&Resolution::ForeignKey {
            holder: Side::A,
            is_required: false,
        }));
        assert!(resolutions.contains(&Resolution::ForeignKey {
            holder: Side::B,
            is_required: false,
        }));
    }

    #[test]
    fn many_to_many_between_tables_is_rejected() {
        let a = end(Stereotype::None, true, Multiplicity::ZeroOrMany);
        let b = end(Stereotype::None, true, Multiplicity::ZeroOrMany);

        assert_eq!(
            resolve(&a, &b, Composition::None),
            vec![Resolution::Rejected {
                holder: Side::A,
                reason: Rejection::ManyToManyBetweenTables,
            }]
        );
    }

    #[test]
    fn many_to_many_exceptions() {
        let a = end(Stereotype::Static, true, Multiplicity::ZeroOrMany);
        let b = end(Stereotype::Static, true, Multiplicity::OneOrMany);

        assert_eq!(
            resolve(&a, &b, Composition::None),
            vec![Resolution::ForeignKeyList {
                holder: Side::A,
                is_persistent: false,
            }]
        );

        assert!(many_to_many_exception(Stereotype::Reference, Stereotype::None));
        assert!(!many_to_many_exception(Stereotype::Reference, Stereotype::Reference));
        assert!(!many_to_many_exception(Stereotype::None, Stereotype::Static));
    }

    #[test]
    fn transient_list_holder_is_allowed() {
        let a = end(Stereotype::None, false, Multiplicity::ZeroOrMany);
        let b = end(Stereotype::None, true, Multiplicity::ZeroOrMany);

        assert_eq!(
            resolve(&a, &b, Composition::None),
            vec![Resolution::ForeignKeyList {
                holder: Side::A,
                is_persistent: false,
            }]
        );
    }

    #[test]
    fn persistent_to_transient_is_rejected() {
        let a = end(Stereotype::None, true, Multiplicity::ZeroOrMany);
        let b = end(Stereotype::None, false, Multiplicity::ExactlyOne);

        assert_eq!(
            resolve(&a, &b, Composition::None),
            vec![Resolution::Rejected {
                holder: Side::A,
                reason: Rejection::PersistentToTransient,
            }]
        );
    }

    #[test]
    fn composition_adds_child_to_owner_only() {
        let order = end(Stereotype::None, false, Multiplicity::ExactlyOne);
        let line = end(Stereotype::None, false, Multiplicity::OneOrMany);

        assert_eq!(
            resolve(&order, &line, Composition::OwnedByA),
            vec![Resolution::ComposedChild {
                owner: Side::A,
                is_collection: true,
            }]
        );
        assert_eq!(
            resolve(&line, &order, Composition::OwnedByB),
            vec![Resolution::ComposedChild {
                owner: Side::B,
                is_collection: true,
            }]
        );
    }

    fn fk(holder: Side, is_required: bool) -> Resolution {
        Resolution::ForeignKey { holder, is_required }
    }

    fn list(holder: Side) -> Resolution {
        Resolution::ForeignKeyList {
            holder,
            is_persistent: false,
        }
    }

    fn rejected(holder: Side, reason: Rejection) -> Resolution {
        Resolution::Rejected { holder, reason }
    }

    #[test]
    fn multiplicity_matrix_between_tables() {
        use Multiplicity::*;
        use Side::*;

        let many_to_many = rejected(A, Rejection::ManyToManyBetweenTables);
        let table: Vec<(Multiplicity, Multiplicity, Vec<Resolution>)> = vec![
            (ZeroOrOne, ZeroOrOne, vec![fk(A, false), fk(B, false)]),
            (ZeroOrOne, ExactlyOne, vec![fk(A, true), fk(B, false)]),
            (ZeroOrOne, ZeroOrMany, vec![fk(B, false)]),
            (ZeroOrOne, OneOrMany, vec![fk(B, false)]),
            (ExactlyOne, ZeroOrOne, vec![fk(A, false), fk(B, true)]),
            (ExactlyOne, ExactlyOne, vec![fk(A, true), fk(B, true)]),
            (ExactlyOne, ZeroOrMany, vec![fk(B, true)]),
            (ExactlyOne, OneOrMany, vec![fk(B, true)]),
            (ZeroOrMany, ZeroOrOne, vec![fk(A, false)]),
            (ZeroOrMany, ExactlyOne, vec![fk(A, true)]),
            (ZeroOrMany, ZeroOrMany, vec![many_to_many]),
            (ZeroOrMany, OneOrMany, vec![many_to_many]),
            (OneOrMany, ZeroOrOne, vec![fk(A, false)]),
            (OneOrMany, ExactlyOne, vec![fk(A, true)]),
            (OneOrMany, ZeroOrMany, vec![many_to_many]),
            (OneOrMany, OneOrMany, vec![many_to_many]),
        ];
        assert_eq!(table.len(), Multiplicity::ALL.len() * Multiplicity::ALL.len());

        for (ma, mb, expected) in table {
            let a = end(Stereotype::None, true, ma);
            let b = end(Stereotype::None, true, mb);
            assert_eq!(resolve(&a, &b, Composition::None), expected, "{} / {}", ma, mb);
        }
    }

    #[test]
    fn many_to_many_by_stereotype() {
        use Stereotype::{None as Plain, Reference, Static};

        let many_to_many = rejected(Side::A, Rejection::ManyToManyBetweenTables);
        let table = [
            (Plain, Plain, many_to_many),
            (Plain, Reference, many_to_many),
            (Plain, Static, many_to_many),
            (Reference, Plain, list(Side::A)),
            (Reference, Reference, many_to_many),
            (Reference, Static, list(Side::A)),
            (Static, Plain, many_to_many),
            (Static, Reference, many_to_many),
            (Static, Static, list(Side::A)),
        ];

        for (sa, sb, expected) in table {
            let a = end(sa, true, Multiplicity::ZeroOrMany);
            let b = end(sb, true, Multiplicity::OneOrMany);
            assert_eq!(resolve(&a, &b, Composition::None), vec![expected], "{:?} / {:?}", sa, sb);
        }
    }

    #[test]
    fn persistence_matrix() {
        use Multiplicity::*;
        use Side::*;

        let to_transient = |holder| rejected(holder, Rejection::PersistentToTransient);
        let table: Vec<(bool, Multiplicity, bool, Multiplicity, Vec<Resolution>)> = vec![
            (true, ZeroOrMany, false, ExactlyOne, vec![to_transient(A)]),
            (false, ZeroOrMany, true, ExactlyOne, vec![fk(A, true)]),
            (false, ZeroOrMany, false, ZeroOrOne, vec![fk(A, false)]),
            (true, ExactlyOne, false, ZeroOrMany, vec![fk(B, true)]),
            (false, ZeroOrOne, true, ZeroOrMany, vec![to_transient(B)]),
            (true, ZeroOrOne, false, ZeroOrOne, vec![to_transient(A), fk(B, false)]),
            (false, ExactlyOne, true, ExactlyOne, vec![fk(A, true), to_transient(B)]),
            (false, ZeroOrOne, false, ExactlyOne, vec![fk(A, true), fk(B, false)]),
            (true, ZeroOrMany, false, OneOrMany, vec![to_transient(A)]),
            (false, ZeroOrMany, true, OneOrMany, vec![list(A)]),
            (false, OneOrMany, false, ZeroOrMany, vec![list(A)]),
        ];

        for (pa, ma, pb, mb, expected) in table {
            let a = end(Stereotype::None, pa, ma);
            let b = end(Stereotype::None, pb, mb);
            assert_eq!(
                resolve(&a, &b, Composition::None),
                expected,
                "{} {} / {} {}",
                pa,
                ma,
                pb,
                mb
            );
        }
    }

    #[test]
    fn composition_ignores_persistence_and_stereotype() {
        for ma in Multiplicity::ALL {
            for mb in Multiplicity::ALL {
                let a = end(Stereotype::Static, true, ma);
                let b = end(Stereotype::Reference, false, mb);

                assert_eq!(
                    resolve(&a, &b, Composition::OwnedByA),
                    vec![Resolution::ComposedChild {
                        owner: Side::A,
                        is_collection: mb.is_many(),
                    }]
                );
                assert_eq!(
                    resolve(&a, &b, Composition::OwnedByB),
                    vec![Resolution::ComposedChild {
                        owner: Side::B,
                        is_collection: ma.is_many(),
                    }]
                );
            }
        }
    }
}
