// api_test.rs - Integration tests for the public match API.

use sremat::prelude::*;

fn compile(build: impl FnOnce(&mut Emitter)) -> CompiledPattern {
    let mut e = Emitter::new();
    build(&mut e);
    e.op(Opcode::Success);
    e.into_pattern(SreFlag::empty()).unwrap()
}

// (\w+)@(\w+)
fn address() -> CompiledPattern {
    compile(|e| {
        e.group(1, |e| e.repeat_one(1, None, |e| e.category(ChCode::UniWord as u32)));
        e.literal('@' as u32);
        e.group(2, |e| e.repeat_one(1, None, |e| e.category(ChCode::UniWord as u32)));
    })
}

// === match_at / search / fullmatch ===

#[test]
fn search_finds_leftmost() {
    let p = address();
    let m = p.search("mail: bob@host, eve@net", 0).unwrap();
    assert_eq!(m.span(0).unwrap(), Some((6, 14)));
    assert_eq!(m.group(1).unwrap(), Some("bob"));
    assert_eq!(m.group(2).unwrap(), Some("host"));
}

#[test]
fn search_from_offset() {
    let p = address();
    let m = p.search("mail: bob@host, eve@net", 15).unwrap();
    assert_eq!(m.groups(), vec![Some("eve"), Some("net")]);
}

#[test]
fn search_range_cuts_text() {
    let p = address();
    assert!(p.search_range("bob@host", 0, 3).is_none());
    let m = p.search_range("bob@host", 0, 6).unwrap();
    assert_eq!(m.group(2).unwrap(), Some("ho"));
}

#[test]
fn match_is_anchored() {
    let p = address();
    assert!(p.match_at(" bob@host", 0).is_none());
    assert!(p.match_at(" bob@host", 1).is_some());
}

#[test]
fn fullmatch_requires_end() {
    let p = address();
    assert!(p.fullmatch("bob@host", 0).is_some());
    assert!(p.fullmatch("bob@host!", 0).is_none());
    assert!(p.match_at("bob@host!", 0).is_some());
}

#[test]
fn fullmatch_range_ends_at_window() {
    let p = address();
    let m = p.fullmatch_range("bob@host!", 0, 8).unwrap();
    assert_eq!(m.span(0).unwrap(), Some((0, 8)));
    assert_eq!(m.group(2).unwrap(), Some("host"));
    assert!(p.fullmatch_range("bob@host!", 0, 9).is_none());
    assert!(p.fullmatch_range("x bob@host", 2, 10).is_some());
}

#[test]
fn no_match_returns_none() {
    let p = address();
    assert!(p.search("nobody home", 0).is_none());
    assert!(!p.is_match("nobody home"));
    assert!(p.is_match("a@b"));
}

#[test]
fn position_past_end_is_clamped() {
    let p = compile(|_| {});
    let m = p.search("abc", 10).unwrap();
    assert_eq!(m.span(0).unwrap(), Some((3, 3)));
}

// === Subjects ===

#[test]
fn utf8_positions_are_bytes() {
    let p = compile(|e| e.literal('\u{e9}' as u32));
    let m = p.search("caf\u{e9}!", 0).unwrap();
    assert_eq!(m.span(0).unwrap(), Some((3, 5)));
    assert_eq!(m.byte_to_char_index(3), 3);
}

#[test]
fn code_unit_subjects() {
    let p = compile(|e| e.literal('\u{e9}' as u32));
    let wide: Vec<u16> = "caf\u{e9}!".encode_utf16().collect();
    assert_eq!(p.search(&wide, 0).unwrap().span(0).unwrap(), Some((3, 4)));

    let chars: Vec<u32> = "caf\u{e9}!".chars().map(|c| c as u32).collect();
    assert_eq!(p.search(&chars, 0).unwrap().span(0).unwrap(), Some((3, 4)));

    let latin1: &[u8] = b"caf\xe9!";
    assert_eq!(p.search(latin1, 0).unwrap().span(0).unwrap(), Some((3, 4)));
}

#[test]
fn literal_wider_than_unit_never_matches() {
    let p = compile(|e| e.literal(0x4e2d));
    assert!(p.search(b"\x2d\x4e".as_slice(), 0).is_none());
}

// === Groups ===

#[test]
fn no_such_group() {
    let p = address();
    let m = p.search("a@b", 0).unwrap();
    assert_eq!(m.span(3), Err(MatchError::NoSuchGroup(3)));
    assert_eq!(m.group(7), Err(MatchError::NoSuchGroup(7)));
    assert_eq!(m.span_of(3), None);
}

#[test]
fn last_index_follows_closing_order() {
    // (a(b))
    let p = compile(|e| {
        e.group(1, |e| {
            e.literal('a' as u32);
            e.group(2, |e| e.literal('b' as u32));
        });
    });
    let m = p.search("ab", 0).unwrap();
    assert_eq!(m.last_index(), Some(1));

    let p = compile(|e| e.literal('x' as u32));
    assert_eq!(p.search("x", 0).unwrap().last_index(), None);
}

#[test]
fn repeated_group_keeps_last_iteration() {
    // (\d)+
    let p = compile(|e| {
        e.repeat(1, None, true, |e| e.group(1, |e| e.category(ChCode::Digit as u32)));
    });
    let m = p.search("x1234", 0).unwrap();
    assert_eq!(m.span(0).unwrap(), Some((1, 5)));
    assert_eq!(m.group(1).unwrap(), Some("4"));
}

// === find_iter / split / sub ===

#[test]
fn find_iter_all_addresses() {
    let p = address();
    let text = "a@b c@d e@f";
    let found: Vec<_> = p.find_iter(text).map(|c| c.text(text, 1)).collect();
    assert_eq!(found, vec![Some("a"), Some("c"), Some("e")]);
}

#[test]
fn find_iter_empty_pattern() {
    let p = compile(|_| {});
    let starts: Vec<_> = p.find_iter("ab").map(|c| c.start()).collect();
    assert_eq!(starts, vec![0, 1, 2]);
}

#[test]
fn find_iter_utf8_steps_by_character() {
    let p = compile(|_| {});
    let text = "\u{e9}\u{4e2d}";
    let starts: Vec<_> = p.find_iter(text).map(|c| c.start()).collect();
    assert_eq!(starts, vec![0, 2, 5]);
}

#[test]
fn split_on_separator() {
    // \s*,\s*
    let p = compile(|e| {
        e.repeat_one(0, None, |e| e.category(ChCode::Space as u32));
        e.literal(',' as u32);
        e.repeat_one(0, None, |e| e.category(ChCode::Space as u32));
    });
    assert_eq!(
        p.split("a , b,c ,d", 0),
        vec![Some("a"), Some("b"), Some("c"), Some("d")]
    );
    assert_eq!(p.split("a , b,c ,d", 2), vec![Some("a"), Some("b"), Some("c ,d")]);
}

#[test]
fn split_bytes() {
    let p = compile(|e| e.literal(0));
    let text: &[u8] = b"ab\0cd\0";
    assert_eq!(
        p.split(text, 0),
        vec![Some(b"ab".as_slice()), Some(b"cd".as_slice()), Some(b"".as_slice())]
    );
}

#[test]
fn sub_swaps_groups() {
    let p = address();
    let text = "to: bob@host";
    let out = p.sub(text, 0, |caps, out: &mut String| {
        out.push_str(caps.text(text, 2).unwrap_or_default());
        out.push_str(" at ");
        out.push_str(caps.text(text, 1).unwrap_or_default());
    });
    assert_eq!(out, "to: host at bob");
}

#[test]
fn subn_counts() {
    let p = compile(|e| e.category(ChCode::Digit as u32));
    let (out, n) = p.subn("a1b22", 0, |_, out: &mut String| out.push('#'));
    assert_eq!(out, "a#b##");
    assert_eq!(n, 3);
    let (out, n) = p.subn("a1b22", 2, |_, out: &mut String| out.push('#'));
    assert_eq!(out, "a#b#2");
    assert_eq!(n, 2);
}

// === Construction ===

#[test]
fn builder_rejects_empty_program() {
    let err = CompiledPattern::builder(Vec::<u32>::new()).build().unwrap_err();
    assert_eq!(err, MatchError::EmptyProgram);
}

#[test]
fn builder_rejects_wide_words_in_16_bit_programs() {
    let err = CompiledPattern::builder([16, 0x1_0000, 1])
        .code_size(CodeSize::U16)
        .build()
        .unwrap_err();
    assert_eq!(err, MatchError::CodeWordTooWide { index: 1, value: 0x1_0000 });
}

#[test]
fn invalid_utf8_is_reported() {
    let err = Utf8Context::from_bytes(b"ab\xffcd", 0, 5).unwrap_err();
    assert_eq!(err, MatchError::InvalidUtf8 { valid_up_to: 2 });
}

#[test]
fn patterns_are_shared_across_threads() {
    let p = address();
    std::thread::scope(|s| {
        for text in ["a@b", "xx c@d", "e@f yy"] {
            let p = &p;
            s.spawn(move || assert!(p.search(text, 0).is_some()));
        }
    });
}
