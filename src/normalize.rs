//! Arabic orthographic normalization.
//!
//! Collapses the variation systems that make naive comparison useless for
//! Arabic names: diacritics, hamza carriers, letter-shape variants,
//! elongation, digit systems and spacing conventions. The output of
//! [`normalize`] is the canonical form all matching runs against.

/// Normalize text into its canonical matching form.
///
/// Total over any Unicode input and idempotent:
/// `normalize(normalize(x)) == normalize(x)`. Empty input normalizes to
/// the empty string.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter_map(|c| {
            match c {
                // Wasl variant of alef
                'ٱ' => Some('ا'),
                // Harakat/tashkeel, superscript alef, and Quranic or
                // honorific annotation marks
                '\u{0610}'..='\u{061A}'
                | '\u{064B}'..='\u{065F}'
                | '\u{0670}'
                | '\u{06D6}'..='\u{06ED}' => None,
                // Alef carrying hamza or madda
                'أ' | 'إ' | 'آ' => Some('ا'),
                // Hamza on waw / yaa
                'ؤ' => Some('و'),
                'ئ' => Some('ي'),
                // Alef maqsura is interchangeable with yaa for matching
                'ى' => Some('ي'),
                // Taa marbouta
                'ة' => Some('ه'),
                // Tatweel elongation, including runs of it
                'ـ' => None,
                // Persian/Urdu keyboard variants; ۃ folds straight to ه
                // so the taa marbouta fold stays a fixed point
                'ک' | 'گ' | 'ڭ' => Some('ك'),
                'ی' | 'ے' => Some('ي'),
                'ۀ' | 'ە' | 'ۃ' => Some('ه'),
                'ٹ' => Some('ت'),
                'پ' => Some('ب'),
                'چ' => Some('ج'),
                'ژ' => Some('ز'),
                'ڤ' => Some('ف'),
                'ڨ' => Some('ق'),
                // Eastern Arabic-Indic digits, Arabic and Persian blocks
                '٠'..='٩' => Some(char::from(b'0' + (c as u32 - 0x0660) as u8)),
                '۰'..='۹' => Some(char::from(b'0' + (c as u32 - 0x06F0) as u8)),
                _ => Some(c),
            }
        })
        .collect();

    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Remove every whitespace character from a canonical form.
///
/// Bridges the two spelling conventions for compound names: a name written
/// as one run-together word and the same name written space-separated
/// compare equal through this variant.
pub fn spaceless(canonical: &str) -> String {
    canonical.chars().filter(|c| !c.is_whitespace()).collect()
}
