/*
 *  display/charmap.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Map accented and special characters onto the HD44780 A00 glyph ROM
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use serde::{Deserialize, Serialize};

// A00 ROM positions of the German glyphs
const ROM_A_UMLAUT: char = '\u{E1}';
const ROM_SHARP_S: char = '\u{E2}';
const ROM_O_UMLAUT: char = '\u{EF}';
const ROM_U_UMLAUT: char = '\u{F5}';

/// How lower-case umlauts and sharp s reach the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UmlautMode {
    /// Use the controller's own glyphs
    #[default]
    Native,
    /// Spell them out: ae, oe, ue, ss
    Ascii,
}

pub fn transform_umlaut_mode(mode: &str) -> UmlautMode {
    match mode {
        "ascii" | "off" | "no" => UmlautMode::Ascii,
        _ => UmlautMode::Native,
    }
}

fn map_char(ch: char, mode: UmlautMode) -> Option<&'static str> {
    let mapped = match ch {
        // currency
        '£' => "#",
        '©' => "(c)",
        // spanish, french
        '¿' => "?",
        'ñ' => "n",
        'à' | 'á' => "a",
        'è' | 'é' => "e",
        'í' | 'î' => "i",
        'ó' | 'ô' => "o",
        'ú' => "u",
        'Á' => "A",
        'É' => "E",
        'Í' => "I",
        'Ñ' => "N",
        'Ó' => "O",
        'Ú' | 'Ü' => "U",
        'ç' => "c",
        'Ç' => "C",
        // german capitals have no ROM glyph
        'Ä' => "Ae",
        'Ö' => "Oe",
        _ => return map_umlaut(ch, mode),
    };
    Some(mapped)
}

fn map_umlaut(ch: char, mode: UmlautMode) -> Option<&'static str> {
    match (mode, ch) {
        (UmlautMode::Native, _) => None,
        (UmlautMode::Ascii, 'ä') => Some("ae"),
        (UmlautMode::Ascii, 'ö') => Some("oe"),
        (UmlautMode::Ascii, 'ü') => Some("ue"),
        (UmlautMode::Ascii, 'ß') => Some("ss"),
        _ => None,
    }
}

fn native_glyph(ch: char) -> char {
    match ch {
        'ä' => ROM_A_UMLAUT,
        'ö' => ROM_O_UMLAUT,
        'ü' => ROM_U_UMLAUT,
        'ß' => ROM_SHARP_S,
        other => other,
    }
}

/// Translate `text` into characters the panel can show
///
/// The result may be longer than the input ("©" becomes "(c)").
pub fn translate(text: &str, mode: UmlautMode) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match map_char(ch, mode) {
            Some(s) => out.push_str(s),
            None if mode == UmlautMode::Native => out.push(native_glyph(ch)),
            None => out.push(ch),
        }
    }
    out
}

/// Truncate or space-pad `text` to exactly `width` characters
pub fn fit_to_width(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

/// Prepare a window for `DisplaySurface::write_line`
pub fn render_line(window: &str, width: usize, mode: UmlautMode, raw_mode: bool) -> String {
    if raw_mode {
        fit_to_width(window, width)
    } else {
        fit_to_width(&translate(window, mode), width)
    }
}

/// Glyph code for one rendered character; anything outside the ROM becomes '?'
pub fn glyph_byte(ch: char) -> u8 {
    u8::try_from(u32::from(ch)).unwrap_or(b'?')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_umlauts_use_rom_codes() {
        let s = translate("Größe über Bär", UmlautMode::Native);
        assert_eq!(s, "Gr\u{EF}\u{E2}e \u{F5}ber B\u{E1}r");
    }

    #[test]
    fn test_ascii_umlauts_spelled_out() {
        assert_eq!(translate("Größe über Bär", UmlautMode::Ascii), "Groesse ueber Baer");
    }

    #[test]
    fn test_capital_umlauts_always_spelled_out() {
        assert_eq!(translate("Äpfel Öl", UmlautMode::Native), "Aepfel Oel");
        assert_eq!(translate("Äpfel Öl", UmlautMode::Ascii), "Aepfel Oel");
    }

    #[test]
    fn test_capital_u_umlaut_drops_the_dots() {
        assert_eq!(translate("Über Ünal", UmlautMode::Native), "Uber Unal");
        assert_eq!(translate("Über", UmlautMode::Ascii), "Uber");
    }

    #[test]
    fn test_accents_and_symbols() {
        assert_eq!(translate("Café Niño ©2013 £5 ¿Qué?", UmlautMode::Native), "Cafe Nino (c)2013 #5 ?Que?");
        assert_eq!(translate("Façade Ça", UmlautMode::Ascii), "Facade Ca");
    }

    #[test]
    fn test_fit_to_width_pads_and_truncates() {
        assert_eq!(fit_to_width("abc", 5), "abc  ");
        assert_eq!(fit_to_width("abcdefg", 5), "abcde");
        assert_eq!(fit_to_width("", 3), "   ");
        assert_eq!(fit_to_width("äöü", 2).chars().count(), 2);
    }

    #[test]
    fn test_render_line_raw_mode_skips_translation() {
        assert_eq!(render_line("©ä", 4, UmlautMode::Ascii, true), "©ä  ");
        assert_eq!(render_line("©ä", 4, UmlautMode::Ascii, false), "(c)a");
    }

    #[test]
    fn test_glyph_byte() {
        assert_eq!(glyph_byte('A'), b'A');
        assert_eq!(glyph_byte('\u{E1}'), 0xE1);
        assert_eq!(glyph_byte('€'), b'?');
    }

    #[test]
    fn test_transform_umlaut_mode() {
        assert_eq!(transform_umlaut_mode("ascii"), UmlautMode::Ascii);
        assert_eq!(transform_umlaut_mode("native"), UmlautMode::Native);
        assert_eq!(transform_umlaut_mode("whatever"), UmlautMode::Native);
    }
}
