//! Enum/tag disambiguation.
//!
//! A tag occurrence like `Red` or `Color.Red` must be attributed to the
//! unique enum that declares it. The search is global first: if exactly
//! one enum anywhere declares the tag, that enum wins. Otherwise the
//! search narrows to one namespace (the qualifier's if the enum name is
//! qualified, the current one if not) and the qualifier's enum name breaks
//! any remaining tie. A tag declared by several enums that the narrowing
//! cannot separate is ambiguous; a tag declared by none is undefined.

use velac_ast::{EnumDecl, NsPath, Program, QName};
use velac_util::{Ident, SrcLoc};

use crate::access;
use crate::error::ResolutionError;
use crate::symbol::{EnumSym, SymbolFactory};

/// Find the unique enum declaring `tag`, seen from `current_ns`.
///
/// `qualifier` is the optional enum name written before the tag
/// (`Color.Red` has qualifier `Color`; `A.Color.Red` has qualifier
/// `A.Color`).
///
/// For a fixed program this is a pure function of its arguments.
pub fn lookup_enum_by_tag<'p>(
    program: &'p Program,
    factory: &SymbolFactory,
    qualifier: Option<&QName>,
    tag: Ident,
    current_ns: &NsPath,
    loc: SrcLoc,
) -> Result<(EnumSym, &'p EnumDecl), ResolutionError> {
    // Pass 1: scan every enum in every namespace.
    let global: Vec<(&NsPath, &EnumDecl)> = program
        .namespaces
        .iter()
        .flat_map(|(ns, decls)| decls.enums.values().map(move |e| (ns, e)))
        .filter(|(_, e)| e.cases.contains_key(&tag))
        .collect();

    if let [(ns, decl)] = global.as_slice() {
        return accessible(factory, ns, decl, current_ns, loc);
    }
    if global.is_empty() {
        return Err(undefined(tag, current_ns, loc));
    }

    // Pass 2: several declarers exist; narrow to one namespace.
    let target_ns = match qualifier {
        Some(q) if q.is_qualified() => &q.namespace,
        _ => current_ns,
    };
    let local: Vec<(&NsPath, &EnumDecl)> = global
        .iter()
        .copied()
        .filter(|(ns, _)| *ns == target_ns)
        .collect();

    match (local.as_slice(), qualifier) {
        ([(ns, decl)], _) => accessible(factory, ns, decl, current_ns, loc),
        ([], None) => {
            // Multiple declarers, none of them local: nothing narrows the
            // choice down.
            Err(ambiguous(&global, tag, current_ns, loc))
        }
        ([], Some(_)) => Err(undefined(tag, current_ns, loc)),
        (_, None) => Err(ambiguous(&local, tag, current_ns, loc)),
        (_, Some(q)) => {
            // The qualifier's enum name settles the tie.
            let named: Vec<(&NsPath, &EnumDecl)> = local
                .iter()
                .copied()
                .filter(|(_, e)| e.ident == q.ident)
                .collect();
            match named.as_slice() {
                [(ns, decl)] => accessible(factory, ns, decl, current_ns, loc),
                _ => Err(undefined(tag, current_ns, loc)),
            }
        }
    }
}

fn undefined(tag: Ident, ns: &NsPath, loc: SrcLoc) -> ResolutionError {
    ResolutionError::UndefinedTag {
        tag,
        ns: ns.clone(),
        loc,
    }
}

fn ambiguous(
    matches: &[(&NsPath, &EnumDecl)],
    tag: Ident,
    ns: &NsPath,
    loc: SrcLoc,
) -> ResolutionError {
    let mut candidates: Vec<SrcLoc> = matches.iter().map(|(_, e)| e.loc).collect();
    candidates.sort();
    ResolutionError::AmbiguousTag {
        tag,
        ns: ns.clone(),
        loc,
        candidates,
    }
}

fn accessible<'p>(
    factory: &SymbolFactory,
    declared_in: &NsPath,
    decl: &'p EnumDecl,
    from: &NsPath,
    loc: SrcLoc,
) -> Result<(EnumSym, &'p EnumDecl), ResolutionError> {
    if !access::is_enum_accessible(decl, declared_in, from) {
        return Err(ResolutionError::InaccessibleEnum {
            name: QName::new(declared_in.clone(), decl.ident, loc),
            ns: from.clone(),
            loc,
        });
    }
    Ok((factory.mk_enum_sym(declared_in, decl.ident, decl.loc), decl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use velac_ast::{CaseDecl, SurfaceType};
    use velac_util::FileId;

    fn enum_with_tags(name: &str, tags: &[&str], loc: SrcLoc) -> EnumDecl {
        let mut cases = IndexMap::new();
        for t in tags {
            let tag = Ident::intern(t);
            cases.insert(
                tag,
                CaseDecl {
                    tag,
                    payload: SurfaceType::Unit,
                    loc,
                },
            );
        }
        EnumDecl {
            ident: Ident::intern(name),
            public: true,
            type_params: vec![],
            cases,
            loc,
        }
    }

    #[test]
    fn globally_unique_tag_wins_from_anywhere() {
        let mut program = Program::new();
        program.add_enum("A", enum_with_tags("Color", &["Red", "Green"], SrcLoc::UNKNOWN));
        let factory = SymbolFactory::new();

        let (sym, _) = lookup_enum_by_tag(
            &program,
            &factory,
            None,
            Ident::intern("Red"),
            &NsPath::parse("Z"),
            SrcLoc::UNKNOWN,
        )
        .unwrap();
        assert_eq!(sym.name.as_str(), "Color");
        assert_eq!(sym.ns, NsPath::parse("A"));
    }

    #[test]
    fn declarers_in_two_namespaces_are_ambiguous_from_a_third() {
        let later = SrcLoc::point(FileId(0), 9, 1);
        let earlier = SrcLoc::point(FileId(0), 3, 1);
        let mut program = Program::new();
        program.add_enum("A", enum_with_tags("Color", &["Red"], later));
        program.add_enum("B", enum_with_tags("Fruit", &["Red"], earlier));
        let factory = SymbolFactory::new();

        let err = lookup_enum_by_tag(
            &program,
            &factory,
            None,
            Ident::intern("Red"),
            &NsPath::parse("C"),
            SrcLoc::UNKNOWN,
        )
        .unwrap_err();
        match err {
            ResolutionError::AmbiguousTag { candidates, .. } => {
                assert_eq!(candidates, vec![earlier, later]);
            }
            other => panic!("expected AmbiguousTag, got {other:?}"),
        }
    }

    #[test]
    fn local_declarer_beats_remote_ones() {
        let mut program = Program::new();
        program.add_enum("A", enum_with_tags("Color", &["Red"], SrcLoc::UNKNOWN));
        program.add_enum("B", enum_with_tags("Fruit", &["Red"], SrcLoc::UNKNOWN));
        let factory = SymbolFactory::new();

        let (sym, _) = lookup_enum_by_tag(
            &program,
            &factory,
            None,
            Ident::intern("Red"),
            &NsPath::parse("B"),
            SrcLoc::UNKNOWN,
        )
        .unwrap();
        assert_eq!(sym.name.as_str(), "Fruit");
    }

    #[test]
    fn two_enums_in_current_namespace_are_ambiguous() {
        let first = SrcLoc::point(FileId(0), 9, 1);
        let second = SrcLoc::point(FileId(0), 3, 1);
        let mut program = Program::new();
        program.add_enum("C", enum_with_tags("Color", &["Red"], first));
        program.add_enum("C", enum_with_tags("Fruit", &["Red"], second));
        let factory = SymbolFactory::new();

        let err = lookup_enum_by_tag(
            &program,
            &factory,
            None,
            Ident::intern("Red"),
            &NsPath::parse("C"),
            SrcLoc::UNKNOWN,
        )
        .unwrap_err();
        match err {
            ResolutionError::AmbiguousTag { candidates, .. } => {
                assert_eq!(candidates, vec![second, first]);
            }
            other => panic!("expected AmbiguousTag, got {other:?}"),
        }
    }

    #[test]
    fn qualifier_breaks_the_tie() {
        let mut program = Program::new();
        program.add_enum("C", enum_with_tags("Color", &["Red"], SrcLoc::UNKNOWN));
        program.add_enum("C", enum_with_tags("Fruit", &["Red"], SrcLoc::UNKNOWN));
        let factory = SymbolFactory::new();

        let qualifier = QName::parse("Fruit", SrcLoc::UNKNOWN);
        let (sym, _) = lookup_enum_by_tag(
            &program,
            &factory,
            Some(&qualifier),
            Ident::intern("Red"),
            &NsPath::parse("C"),
            SrcLoc::UNKNOWN,
        )
        .unwrap();
        assert_eq!(sym.name.as_str(), "Fruit");
    }

    #[test]
    fn qualified_qualifier_restricts_namespace() {
        let mut program = Program::new();
        program.add_enum("A", enum_with_tags("Color", &["Red"], SrcLoc::UNKNOWN));
        program.add_enum("B", enum_with_tags("Color", &["Red"], SrcLoc::UNKNOWN));
        let factory = SymbolFactory::new();

        let qualifier = QName::parse("B.Color", SrcLoc::UNKNOWN);
        let (sym, _) = lookup_enum_by_tag(
            &program,
            &factory,
            Some(&qualifier),
            Ident::intern("Red"),
            &NsPath::parse("Z"),
            SrcLoc::UNKNOWN,
        )
        .unwrap();
        assert_eq!(sym.ns, NsPath::parse("B"));
    }

    #[test]
    fn missing_tag_is_undefined() {
        let program = Program::new();
        let factory = SymbolFactory::new();
        let err = lookup_enum_by_tag(
            &program,
            &factory,
            None,
            Ident::intern("Nope"),
            &NsPath::root(),
            SrcLoc::UNKNOWN,
        )
        .unwrap_err();
        assert_eq!(err.code(), "UndefinedTag");
    }

    #[test]
    fn private_unique_declarer_is_inaccessible_elsewhere() {
        let mut program = Program::new();
        let mut decl = enum_with_tags("Secret", &["Hidden"], SrcLoc::UNKNOWN);
        decl.public = false;
        program.add_enum("A", decl);
        let factory = SymbolFactory::new();

        let err = lookup_enum_by_tag(
            &program,
            &factory,
            None,
            Ident::intern("Hidden"),
            &NsPath::parse("B"),
            SrcLoc::UNKNOWN,
        )
        .unwrap_err();
        assert_eq!(err.code(), "InaccessibleEnum");
    }

    #[test]
    fn lookup_is_deterministic() {
        let mut program = Program::new();
        program.add_enum("A", enum_with_tags("Color", &["Red"], SrcLoc::UNKNOWN));
        let factory = SymbolFactory::new();
        let a = lookup_enum_by_tag(
            &program,
            &factory,
            None,
            Ident::intern("Red"),
            &NsPath::root(),
            SrcLoc::UNKNOWN,
        )
        .unwrap()
        .0;
        let b = lookup_enum_by_tag(
            &program,
            &factory,
            None,
            Ident::intern("Red"),
            &NsPath::root(),
            SrcLoc::UNKNOWN,
        )
        .unwrap()
        .0;
        assert_eq!(a, b);
    }
}
