/*
 *   Copyright (c) 2025 twinax-ctl contributors
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! The two built-in scancode dictionaries shipped with the controller:
//! `5250_es` (Spanish QWERTY) and `5250_us` (US QWERTY).
//!
//! Scancode-to-string mappings are taken verbatim from the keyboard
//! layout tables of the reference implementation; this module only
//! reshapes them into [`ScancodeDictionary`]'s fixed `KeyEntry` slots.

use crate::dictionary::{KeyEntry, ScancodeDictionary, SpecialGroups};

fn shared_specials() -> SpecialGroups {
    SpecialGroups {
        ctrl_press: [0x54].into_iter().collect(),
        ctrl_release: [0xD4].into_iter().collect(),
        alt_press: [0x68].into_iter().collect(),
        alt_release: [].into_iter().collect(),
        shift_press: [0x57, 0x56].into_iter().collect(),
        shift_release: [0xD7, 0xD6].into_iter().collect(),
        caps_lock: [0x7E].into_iter().collect(),
        extra: [].into_iter().collect(),
    }
}

fn esc() -> &'static str {
    "\u{1b}"
}

/// Builds the Spanish keyboard layout (`5250_ES` in the reference tables).
pub fn es() -> ScancodeDictionary {
    let mut b = ScancodeDictionary::builder("5250_es").specials(shared_specials());
    // Function row: F1/F2 as ESC, F3..F10 present but unmapped (reserved
    // for future function-key support per the reference table).
    b = b
        .key(0x7C, KeyEntry::normal(esc()).with_shift(esc()))
        .key(0x6F, KeyEntry::normal(esc()).with_shift(esc()));
    for code in [0x6C, 0x6D, 0x6E, 0x7D, 0x71, 0x70, 0x72, 0x73] {
        b = b.key(code, KeyEntry::default());
    }

    b = b
        .key(0x3E, KeyEntry::normal("\u{ba}").with_shift("\u{aa}").with_alt("\\"))
        .key(0x31, KeyEntry::normal("1").with_shift("!").with_alt("|"))
        .key(0x32, KeyEntry::normal("2").with_shift("\"").with_alt("@"))
        .key(0x33, KeyEntry::normal("3").with_shift("\u{b7}").with_alt("#"))
        .key(0x34, KeyEntry::normal("4").with_shift("$").with_alt("~"))
        .key(0x35, KeyEntry::normal("5").with_shift("%").with_alt("\u{bd}"))
        .key(0x36, KeyEntry::normal("6").with_shift("&"))
        .key(0x37, KeyEntry::normal("7").with_shift("/"))
        .key(0x38, KeyEntry::normal("8").with_shift("("))
        .key(0x39, KeyEntry::normal("9").with_shift(")"))
        .key(0x3A, KeyEntry::normal("0").with_shift("="))
        .key(0x3B, KeyEntry::normal("'").with_shift("?").with_ctrl("\u{1c}"))
        .key(0x3C, KeyEntry::normal("\u{a1}").with_shift("\u{bf}"))
        .key(0x3D, KeyEntry::normal("\u{08}").with_shift("\u{08}")) // BS
        .key(0x4B, KeyEntry::default())
        .key(0x4C, KeyEntry::default()) // DUP
        .key(0x20, KeyEntry::normal("\t").with_shift("\t")) // TAB
        .key(0x21, KeyEntry::normal("q").with_shift("Q").with_ctrl("\u{11}"))
        .key(0x22, KeyEntry::normal("w").with_shift("W").with_ctrl("\u{17}"))
        .key(0x23, KeyEntry::normal("e").with_shift("E").with_ctrl("\u{05}"))
        .key(0x24, KeyEntry::normal("r").with_shift("R").with_ctrl("\u{12}"))
        .key(0x25, KeyEntry::normal("t").with_shift("T").with_ctrl("\u{14}"))
        .key(0x26, KeyEntry::normal("y").with_shift("Y").with_ctrl("\u{19}"))
        .key(0x27, KeyEntry::normal("u").with_shift("U").with_ctrl("\u{15}"))
        .key(0x28, KeyEntry::normal("i").with_shift("I").with_ctrl("\u{09}"))
        .key(0x29, KeyEntry::normal("o").with_shift("O").with_ctrl("\u{0f}"))
        .key(0x2A, KeyEntry::normal("p").with_shift("P").with_ctrl("\u{10}"))
        .key(0x2B, KeyEntry::normal("`").with_shift("^").with_alt("[").with_ctrl(esc()))
        .key(0x2C, KeyEntry::normal("+").with_shift("*").with_alt("]").with_ctrl("\u{1d}"))
        .key(0x2D, KeyEntry::normal("\r").with_shift("\r")) // ENTER
        .key(0x47, KeyEntry::normal("7").with_shift("7"))
        .key(
            0x48,
            KeyEntry::normal("8")
                .with_shift("8")
                .with_alt(esc())
                .with_ctrl(esc())
                .with_esc_suffix("A"), // NUMPAD 8 / UP ARROW
        )
        .key(0x49, KeyEntry::normal("9").with_shift("9"))
        .key(0x4E, KeyEntry::default())
        .key(0x11, KeyEntry::normal("a").with_shift("A").with_ctrl("\u{01}"))
        .key(0x12, KeyEntry::normal("s").with_shift("S").with_ctrl("\u{13}"))
        .key(0x13, KeyEntry::normal("d").with_shift("D").with_ctrl("\u{04}"))
        .key(0x14, KeyEntry::normal("f").with_shift("F").with_ctrl("\u{06}"))
        .key(0x15, KeyEntry::normal("g").with_shift("G").with_ctrl("\u{07}"))
        .key(0x16, KeyEntry::normal("h").with_shift("H").with_ctrl("\u{08}"))
        .key(0x17, KeyEntry::normal("j").with_shift("J").with_ctrl("\u{0a}"))
        .key(0x18, KeyEntry::normal("k").with_shift("K").with_ctrl("\u{0b}"))
        .key(0x19, KeyEntry::normal("l").with_shift("L").with_ctrl("\u{0c}"))
        .key(0x1A, KeyEntry::normal("\u{f1}").with_shift("\u{d1}"))
        .key(0x1B, KeyEntry::normal("\u{b4}").with_shift("\u{a8}").with_alt("{").with_ctrl(esc()))
        .key(0x1C, KeyEntry::normal("\u{e7}").with_shift("\u{c7}").with_alt("}").with_ctrl("\u{1d}"))
        .key(
            0x44,
            KeyEntry::normal("4")
                .with_shift("4")
                .with_alt(esc())
                .with_ctrl(esc())
                .with_esc_suffix("D"), // NUMPAD 4 / LEFT ARROW
        )
        .key(0x45, KeyEntry::normal("5").with_shift("5"))
        .key(
            0x46,
            KeyEntry::normal("6")
                .with_shift("6")
                .with_alt(esc())
                .with_ctrl(esc())
                .with_esc_suffix("C"), // NUMPAD 6 / RIGHT ARROW
        )
        .key(0x4D, KeyEntry::normal("\r")) // ENTER
        .key(0x0E, KeyEntry::normal("<").with_shift(">").with_alt("|"))
        .key(0x01, KeyEntry::normal("z").with_shift("Z").with_ctrl("\u{1a}"))
        .key(0x02, KeyEntry::normal("x").with_shift("X").with_ctrl("\u{18}"))
        .key(0x03, KeyEntry::normal("c").with_shift("C").with_ctrl("\u{03}"))
        .key(0x04, KeyEntry::normal("v").with_shift("V").with_ctrl("\u{16}"))
        .key(0x05, KeyEntry::normal("b").with_shift("B").with_ctrl("\u{02}"))
        .key(0x06, KeyEntry::normal("n").with_shift("N").with_ctrl("\u{0e}"))
        .key(0x07, KeyEntry::normal("m").with_shift("M").with_ctrl("\r"))
        .key(0x08, KeyEntry::normal(",").with_shift(";"))
        .key(0x09, KeyEntry::normal(".").with_shift(":"))
        .key(0x0A, KeyEntry::normal("-").with_shift("_").with_ctrl("\u{1f}"))
        .key(0x0C, KeyEntry::default())
        .key(0x41, KeyEntry::normal("1").with_shift("1"))
        .key(
            0x42,
            KeyEntry::normal("2")
                .with_shift("2")
                .with_alt(esc())
                .with_ctrl(esc())
                .with_esc_suffix("B"), // NUMPAD 2 / DOWN ARROW
        )
        .key(0x43, KeyEntry::normal("3").with_shift("3"))
        .key(0x68, KeyEntry::default())
        .key(0x40, KeyEntry::normal("0").with_shift("0"))
        .key(0x4A, KeyEntry::normal(","))
        .key(0x0F, KeyEntry::normal(" ").with_shift(" ")) // SPACE
        .ebcdic_override('[', 0x4A)
        .ebcdic_override(']', 0x5A)
        .ebcdic_override('^', 0x95)
        .ebcdic_override('#', 0xBC);

    b.build()
}

/// Builds the US keyboard layout (`5250_US` in the reference tables).
pub fn us() -> ScancodeDictionary {
    let mut b = ScancodeDictionary::builder("5250_us").specials(shared_specials());
    b = b
        .key(0x7C, KeyEntry::normal(esc()).with_shift(esc()))
        .key(0x6F, KeyEntry::normal(esc()).with_shift(esc()));

    b = b
        .key(0x3E, KeyEntry::normal("`").with_shift("~").with_alt("`"))
        .key(0x31, KeyEntry::normal("1").with_shift("|"))
        .key(0x32, KeyEntry::normal("2").with_shift("@"))
        .key(0x33, KeyEntry::normal("3").with_shift("#"))
        .key(0x34, KeyEntry::normal("4").with_shift("$"))
        .key(0x35, KeyEntry::normal("5").with_shift("%"))
        .key(0x36, KeyEntry::normal("6").with_shift("^"))
        .key(0x37, KeyEntry::normal("7").with_shift("&"))
        .key(0x38, KeyEntry::normal("8").with_shift("*"))
        .key(0x39, KeyEntry::normal("9").with_shift("("))
        .key(0x3A, KeyEntry::normal("0").with_shift(")"))
        .key(0x3B, KeyEntry::normal("-").with_shift("_").with_ctrl("\u{1c}"))
        .key(0x3C, KeyEntry::normal("=").with_shift("+"))
        .key(0x3D, KeyEntry::normal("\u{08}").with_shift("\u{08}"))
        .key(0x4B, KeyEntry::default())
        .key(0x4C, KeyEntry::default())
        .key(0x20, KeyEntry::normal("\t").with_shift("\t"))
        .key(0x21, KeyEntry::normal("q").with_shift("Q").with_ctrl("\u{11}"))
        .key(0x22, KeyEntry::normal("w").with_shift("W").with_ctrl("\u{17}"))
        .key(0x23, KeyEntry::normal("e").with_shift("E").with_ctrl("\u{05}"))
        .key(0x24, KeyEntry::normal("r").with_shift("R").with_ctrl("\u{12}"))
        .key(0x25, KeyEntry::normal("t").with_shift("T").with_ctrl("\u{14}"))
        .key(0x26, KeyEntry::normal("y").with_shift("Y").with_ctrl("\u{19}"))
        .key(0x27, KeyEntry::normal("u").with_shift("U").with_ctrl("\u{15}"))
        .key(0x28, KeyEntry::normal("i").with_shift("I").with_ctrl("\u{09}"))
        .key(0x29, KeyEntry::normal("o").with_shift("O").with_ctrl("\u{0f}"))
        .key(0x2A, KeyEntry::normal("p").with_shift("P").with_ctrl("\u{10}"))
        .key(0x2B, KeyEntry::normal("\u{a2}").with_shift("!").with_ctrl(esc()))
        .key(0x2C, KeyEntry::normal("\\").with_shift("|").with_ctrl("\u{1d}"))
        .key(0x2D, KeyEntry::normal("\r").with_shift("\r"))
        .key(0x47, KeyEntry::normal("7").with_shift("7"))
        .key(
            0x48,
            KeyEntry::normal("8")
                .with_shift("8")
                .with_alt(esc())
                .with_ctrl(esc())
                .with_esc_suffix("A"),
        )
        .key(0x49, KeyEntry::normal("9").with_shift("9"))
        .key(0x4E, KeyEntry::default())
        .key(0x11, KeyEntry::normal("a").with_shift("A").with_ctrl("\u{01}"))
        .key(0x12, KeyEntry::normal("s").with_shift("S").with_ctrl("\u{13}"))
        .key(0x13, KeyEntry::normal("d").with_shift("D").with_ctrl("\u{04}"))
        .key(0x14, KeyEntry::normal("f").with_shift("F").with_ctrl("\u{06}"))
        .key(0x15, KeyEntry::normal("g").with_shift("G").with_ctrl("\u{07}"))
        .key(0x16, KeyEntry::normal("h").with_shift("H").with_ctrl("\u{08}"))
        .key(0x17, KeyEntry::normal("j").with_shift("J").with_ctrl("\u{0a}"))
        .key(0x18, KeyEntry::normal("k").with_shift("K").with_ctrl("\u{0b}"))
        .key(0x19, KeyEntry::normal("l").with_shift("L").with_ctrl("\u{0c}"))
        .key(0x1A, KeyEntry::normal(";").with_shift(":"))
        .key(0x1B, KeyEntry::normal("'").with_shift("\"").with_ctrl(esc()))
        .key(0x1C, KeyEntry::normal("{").with_shift("}").with_ctrl("\u{1d}"))
        .key(
            0x44,
            KeyEntry::normal("4")
                .with_shift("4")
                .with_alt(esc())
                .with_ctrl(esc())
                .with_esc_suffix("D"),
        )
        .key(0x45, KeyEntry::normal("5").with_shift("5"))
        .key(
            0x46,
            KeyEntry::normal("6")
                .with_shift("6")
                .with_alt(esc())
                .with_ctrl(esc())
                .with_esc_suffix("C"),
        )
        .key(0x4D, KeyEntry::normal("\r"))
        .key(0x0E, KeyEntry::normal("<").with_shift(">").with_alt("|"))
        .key(0x01, KeyEntry::normal("z").with_shift("Z").with_ctrl("\u{1a}"))
        .key(0x02, KeyEntry::normal("x").with_shift("X").with_ctrl("\u{18}"))
        .key(0x03, KeyEntry::normal("c").with_shift("C").with_ctrl("\u{03}"))
        .key(0x04, KeyEntry::normal("v").with_shift("V").with_ctrl("\u{16}"))
        .key(0x05, KeyEntry::normal("b").with_shift("B").with_ctrl("\u{02}"))
        .key(0x06, KeyEntry::normal("n").with_shift("N").with_ctrl("\u{0e}"))
        .key(0x07, KeyEntry::normal("m").with_shift("M").with_ctrl("\r"))
        .key(0x08, KeyEntry::normal(",").with_shift("<"))
        .key(0x09, KeyEntry::normal(".").with_shift(">"))
        .key(0x0A, KeyEntry::normal("/").with_shift("?").with_ctrl("\u{1f}"))
        .key(0x0C, KeyEntry::default())
        .key(0x41, KeyEntry::normal("1").with_shift("1"))
        .key(
            0x42,
            KeyEntry::normal("2")
                .with_shift("2")
                .with_alt(esc())
                .with_ctrl(esc())
                .with_esc_suffix("B"),
        )
        .key(0x43, KeyEntry::normal("3").with_shift("3"))
        .key(0x68, KeyEntry::default())
        .key(0x40, KeyEntry::normal("0").with_shift("0"))
        .key(0x4A, KeyEntry::normal(","))
        .key(0x0F, KeyEntry::normal(" ").with_shift(" "));

    b.build()
}

/// Resolves a dictionary by name, as the `--dictionary` CLI option does.
pub fn by_name(name: &str) -> Option<ScancodeDictionary> {
    match name {
        "5250_es" => Some(es()),
        "5250_us" => Some(us()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn es_dictionary_maps_q_row() {
        let dict = es();
        assert_eq!(dict.keys[&0x21].normal, "q");
        assert_eq!(dict.keys[&0x21].ctrl, "\u{11}");
    }

    #[test]
    fn us_dictionary_differs_from_es_on_punctuation_row() {
        let es = es();
        let us = us();
        assert_eq!(es.keys[&0x2B].normal, "`");
        assert_eq!(us.keys[&0x2B].normal, "\u{a2}");
    }

    #[test]
    fn arrow_keys_share_esc_normal_with_distinct_suffixes() {
        let dict = us();
        assert_eq!(dict.keys[&0x48].esc_suffix.as_deref(), Some("A"));
        assert_eq!(dict.keys[&0x42].esc_suffix.as_deref(), Some("B"));
        assert_eq!(dict.keys[&0x44].esc_suffix.as_deref(), Some("D"));
        assert_eq!(dict.keys[&0x46].esc_suffix.as_deref(), Some("C"));
    }

    #[test]
    fn by_name_resolves_known_dictionaries_only() {
        assert!(by_name("5250_es").is_some());
        assert!(by_name("5250_us").is_some());
        assert!(by_name("nope").is_none());
    }

    #[test]
    fn es_custom_conversions_override_codepage() {
        let dict = es();
        assert_eq!(dict.ebcdic_overrides.get(&'['), Some(&0x4A));
    }
}
