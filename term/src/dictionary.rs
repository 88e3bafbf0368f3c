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

//! Scancode dictionaries: the immutable per-terminal table mapping raw
//! keyboard scancodes to the bytes written to the child's stdin.
//!
//! Modeled as the Design Notes prescribe: special groups of raw scancodes,
//! a flat map of scancode to a fixed-shape [`KeyEntry`], and a small map of
//! EBCDIC overrides — rather than the heterogeneous, dynamically-typed
//! tables the original keyboard maps used.

use std::collections::{HashMap, HashSet};

/// The four mandatory output strings plus the two optional suffixes a key
/// can carry, per the Design Notes' fixed `KeyEntry` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEntry {
    pub normal: String,
    pub shift: String,
    pub alt: String,
    pub ctrl: String,
    /// Sent after the chosen slot's bytes when that slot is exactly ESC —
    /// encodes arrow keys and similar as ESC+letter.
    pub esc_suffix: Option<String>,
    /// Sent (as ESC + this) instead of the normal slot when the `extra`
    /// modifier was armed immediately before this key.
    pub extra_suffix: Option<String>,
}

impl KeyEntry {
    pub fn normal(s: impl Into<String>) -> Self {
        Self {
            normal: s.into(),
            ..Default::default()
        }
    }

    pub fn with_shift(mut self, s: impl Into<String>) -> Self {
        self.shift = s.into();
        self
    }

    pub fn with_alt(mut self, s: impl Into<String>) -> Self {
        self.alt = s.into();
        self
    }

    pub fn with_ctrl(mut self, s: impl Into<String>) -> Self {
        self.ctrl = s.into();
        self
    }

    pub fn with_esc_suffix(mut self, s: impl Into<String>) -> Self {
        self.esc_suffix = Some(s.into());
        self
    }

    pub fn with_extra_suffix(mut self, s: impl Into<String>) -> Self {
        self.extra_suffix = Some(s.into());
        self
    }
}

/// The eight special scancode groups: membership, not ordering, matters.
#[derive(Debug, Clone, Default)]
pub struct SpecialGroups {
    pub ctrl_press: HashSet<u16>,
    pub ctrl_release: HashSet<u16>,
    pub alt_press: HashSet<u16>,
    pub alt_release: HashSet<u16>,
    pub shift_press: HashSet<u16>,
    pub shift_release: HashSet<u16>,
    pub caps_lock: HashSet<u16>,
    pub extra: HashSet<u16>,
}

/// An immutable, fully-built scancode dictionary.
#[derive(Debug, Clone)]
pub struct ScancodeDictionary {
    pub name: String,
    pub specials: SpecialGroups,
    pub keys: HashMap<u16, KeyEntry>,
    pub ebcdic_overrides: HashMap<char, u8>,
}

impl ScancodeDictionary {
    pub fn builder(name: impl Into<String>) -> ScancodeDictionaryBuilder {
        ScancodeDictionaryBuilder {
            name: name.into(),
            specials: SpecialGroups::default(),
            keys: HashMap::new(),
            ebcdic_overrides: HashMap::new(),
        }
    }
}

/// Builds a [`ScancodeDictionary`], surfacing duplicate key definitions as
/// warnings instead of silently letting the later one win — the Design
/// Notes call out the original tables' last-write-wins duplicates as a
/// defect to detect, not reproduce.
pub struct ScancodeDictionaryBuilder {
    name: String,
    specials: SpecialGroups,
    keys: HashMap<u16, KeyEntry>,
    ebcdic_overrides: HashMap<char, u8>,
}

impl ScancodeDictionaryBuilder {
    pub fn specials(mut self, specials: SpecialGroups) -> Self {
        self.specials = specials;
        self
    }

    /// Inserts a key entry. If `code` was already defined, the earlier
    /// entry is kept, the new one is discarded, and a warning is logged —
    /// duplicates are a dictionary-authoring bug, not a feature.
    pub fn key(mut self, code: u16, entry: KeyEntry) -> Self {
        if let Some(existing) = self.keys.get(&code) {
            tracing::warn!(
                dictionary = %self.name,
                scancode = code,
                ?existing,
                attempted = ?entry,
                "duplicate scancode definition ignored"
            );
            return self;
        }
        self.keys.insert(code, entry);
        self
    }

    pub fn ebcdic_override(mut self, ch: char, code: u8) -> Self {
        self.ebcdic_overrides.insert(ch, code);
        self
    }

    pub fn build(self) -> ScancodeDictionary {
        ScancodeDictionary {
            name: self.name,
            specials: self.specials,
            keys: self.keys,
            ebcdic_overrides: self.ebcdic_overrides,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_definition_of_a_duplicate_key_wins() {
        let dict = ScancodeDictionary::builder("test")
            .key(0x1E, KeyEntry::normal("a"))
            .key(0x1E, KeyEntry::normal("z"))
            .build();
        assert_eq!(dict.keys[&0x1E].normal, "a");
    }

    #[test]
    fn esc_suffix_round_trips() {
        let entry = KeyEntry::normal("\u{1b}").with_esc_suffix("A");
        assert_eq!(entry.esc_suffix.as_deref(), Some("A"));
    }
}
