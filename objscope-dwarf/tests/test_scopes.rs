//! Scope chains and the depth-first visitor.

mod common;

use objscope_dwarf::constants::*;
use objscope_dwarf::{visit_scopes, DieChain, ErrorKind, Visit};

use common::fixture;

#[test]
fn scopes_of_a_nested_variable() {
    let f = fixture();
    let dwarf = f.dwarf();

    let tmp = dwarf.die_at(f.tmp_var).unwrap();
    let scopes = tmp.scopes().unwrap();

    // Innermost first, unit root last.
    let offsets: Vec<u64> = scopes.iter().map(|die| die.offset()).collect();
    assert_eq!(offsets, vec![f.tmp_var, f.block, f.main_die, f.cu1 + 11]);

    let tags: Vec<u32> = scopes.iter().map(|die| die.tag()).collect();
    assert_eq!(
        tags,
        vec![
            DW_TAG_variable,
            DW_TAG_lexical_block,
            DW_TAG_subprogram,
            DW_TAG_compile_unit
        ]
    );
}

#[test]
fn scopes_of_a_top_level_function() {
    let f = fixture();
    let dwarf = f.dwarf();

    let main = dwarf.die_at(f.main_die).unwrap();
    let scopes = main.scopes().unwrap();
    let offsets: Vec<u64> = scopes.iter().map(|die| die.offset()).collect();
    assert_eq!(offsets, vec![f.main_die, f.cu1 + 11]);
}

#[test]
fn the_unit_root_has_no_scope_chain() {
    let f = fixture();
    let dwarf = f.dwarf();

    let unit = dwarf.unit_at(f.cu1).unwrap();
    let root = dwarf.unit_die(unit);
    assert_eq!(root.scopes().unwrap_err().kind(), ErrorKind::NoEntry);
}

#[test]
fn skip_children_prunes_a_subtree() {
    let f = fixture();
    let dwarf = f.dwarf();
    let unit = dwarf.unit_at(f.cu1).unwrap();
    let root = DieChain {
        die: dwarf.unit_die(unit),
        parent: None,
    };

    let mut visited = Vec::new();
    let aborted = visit_scopes(
        2,
        &root,
        &mut |_, chain| {
            visited.push(chain.die.offset());
            if chain.die.offset() == f.main_die {
                Ok(Visit::SkipChildren)
            } else {
                Ok(Visit::Continue)
            }
        },
        None,
    )
    .unwrap();
    assert!(!aborted);

    // main's parameters and blocks were pruned; everything else visited.
    similar_asserts::assert_eq!(
        visited,
        vec![
            f.int_type,
            f.main_die,
            f.abstract_die,
            f.caller,
            f.inline_copy,
            f.global_var
        ]
    );
}

#[test]
fn abort_unwinds_immediately() {
    let f = fixture();
    let dwarf = f.dwarf();
    let unit = dwarf.unit_at(f.cu1).unwrap();
    let root = DieChain {
        die: dwarf.unit_die(unit),
        parent: None,
    };

    let mut pre_count = 0;
    let mut post_count = 0;
    let aborted = visit_scopes(
        2,
        &root,
        &mut |_, chain| {
            pre_count += 1;
            if chain.die.offset() == f.argc {
                Ok(Visit::Abort)
            } else {
                Ok(Visit::Continue)
            }
        },
        Some(&mut |_, _| {
            post_count += 1;
            Ok(Visit::Continue)
        }),
    )
    .unwrap();

    assert!(aborted);
    // int_type, main, argc; nothing after the abort.
    assert_eq!(pre_count, 3);
    // int_type's post ran before main was entered; no other post call.
    assert_eq!(post_count, 1);
}

#[test]
fn chain_depth_and_post_order() {
    let f = fixture();
    let dwarf = f.dwarf();
    let unit = dwarf.unit_at(f.cu1).unwrap();
    let root = DieChain {
        die: dwarf.unit_die(unit),
        parent: None,
    };

    let mut depths = Vec::new();
    visit_scopes(
        2,
        &root,
        &mut |depth, chain| {
            assert_eq!(chain.depth(), depth);
            depths.push((chain.die.offset(), depth));
            Ok(Visit::Continue)
        },
        None,
    )
    .unwrap();

    assert!(depths.contains(&(f.tmp_var, 4)));
    assert!(depths.contains(&(f.argc, 3)));
    assert!(depths.contains(&(f.global_var, 2)));
}
