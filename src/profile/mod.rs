//! Character-form conversion profiles.
//!
//! A [`ConversionProfile`] selects a named strategy for mapping Chinese text
//! between character-form conventions: traditional, simplified, and the
//! glyph set recommended by the 2013 General Standard Chinese Characters
//! chart. A profile is chosen once per conversion job and passed explicitly
//! wherever text is rewritten; there is no global state.
//!
//! Each profile is a fixed, ordered chain of mapping passes over static
//! tables (see [`tables`]). Conversion is a pure function of its input and
//! is idempotent on its own output.
//!
//! # Example
//!
//! ```
//! use longan::profile::ConversionProfile;
//!
//! let profile = ConversionProfile::ToSimplified;
//! assert_eq!(profile.convert("豐收"), "丰收");
//! // Applying the profile to its own output is a no-op.
//! assert_eq!(profile.convert("丰收"), "丰收");
//! ```

mod tables;

use tables::{NEW_GLYPH_PASS, Pass, SIMPLIFY_PASS, TRADITIONALIZE_PASS, VARIANT_PASS};

/// A named character-form mapping strategy.
///
/// Immutable; chosen once per conversion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionProfile {
    /// Normalize everything (simplified characters, variants, and old
    /// glyph forms) to the government-standard traditional glyph set.
    ToGovernmentStandard,
    /// Modernize old glyph forms and map simplified characters to
    /// traditional, but keep variant characters as written.
    ToNewGlyphsKeepVariants,
    /// Normalize variants and old glyph forms to the government-standard
    /// traditional set, leaving simplified characters untouched.
    ToGovernmentStandardKeepSimplified,
    /// Modernize old glyph forms only; simplified characters and variants
    /// both pass through.
    ToNewGlyphsKeepSimplifiedAndVariants,
    /// Map to the simplified standard.
    ToSimplified,
}

impl ConversionProfile {
    /// All profiles, in menu order.
    pub const ALL: [ConversionProfile; 5] = [
        ConversionProfile::ToGovernmentStandard,
        ConversionProfile::ToNewGlyphsKeepVariants,
        ConversionProfile::ToGovernmentStandardKeepSimplified,
        ConversionProfile::ToNewGlyphsKeepSimplifiedAndVariants,
        ConversionProfile::ToSimplified,
    ];

    /// Short identifier used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ToGovernmentStandard => "government-standard",
            Self::ToNewGlyphsKeepVariants => "new-glyphs-keep-variants",
            Self::ToGovernmentStandardKeepSimplified => "government-standard-keep-simplified",
            Self::ToNewGlyphsKeepSimplifiedAndVariants => "new-glyphs-keep-simplified-and-variants",
            Self::ToSimplified => "simplified",
        }
    }

    /// Convert `text` under this profile.
    ///
    /// Characters without a mapping pass through unchanged, so the function
    /// is total and safe to apply to mixed-script text.
    pub fn convert(&self, text: &str) -> String {
        let mut current = std::borrow::Cow::Borrowed(text);
        for pass in self.passes() {
            current = std::borrow::Cow::Owned(pass.apply(&current));
        }
        current.into_owned()
    }

    fn passes(&self) -> &'static [&'static Pass] {
        match self {
            Self::ToGovernmentStandard => &GOVERNMENT_STANDARD,
            Self::ToNewGlyphsKeepVariants => &NEW_GLYPHS_KEEP_VARIANTS,
            Self::ToGovernmentStandardKeepSimplified => &GOVERNMENT_STANDARD_KEEP_SIMPLIFIED,
            Self::ToNewGlyphsKeepSimplifiedAndVariants => &NEW_GLYPHS_ONLY,
            Self::ToSimplified => &SIMPLIFIED,
        }
    }
}

static GOVERNMENT_STANDARD: [&Pass; 3] =
    [&TRADITIONALIZE_PASS, &NEW_GLYPH_PASS, &VARIANT_PASS];
static NEW_GLYPHS_KEEP_VARIANTS: [&Pass; 2] = [&TRADITIONALIZE_PASS, &NEW_GLYPH_PASS];
static GOVERNMENT_STANDARD_KEEP_SIMPLIFIED: [&Pass; 2] = [&NEW_GLYPH_PASS, &VARIANT_PASS];
static NEW_GLYPHS_ONLY: [&Pass; 1] = [&NEW_GLYPH_PASS];
static SIMPLIFIED: [&Pass; 3] = [&NEW_GLYPH_PASS, &VARIANT_PASS, &SIMPLIFY_PASS];

/// Whether `text` contains at least one CJK ideograph (U+4E00–U+9FFF).
///
/// Used by the encoding cascade and the fallback XML rewriter to tell real
/// Chinese text apart from markup noise and mis-decoded bytes.
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplified_maps_the_canonical_pair() {
        assert_eq!(ConversionProfile::ToSimplified.convert("豐"), "丰");
    }

    #[test]
    fn simplified_runs_variants_first() {
        // 爲 is a variant of 為, which then simplifies to 为.
        assert_eq!(ConversionProfile::ToSimplified.convert("爲了"), "为了");
    }

    #[test]
    fn government_standard_traditionalizes() {
        let p = ConversionProfile::ToGovernmentStandard;
        assert_eq!(p.convert("国家"), "國家");
        assert_eq!(p.convert("爲衆人"), "為眾人");
    }

    #[test]
    fn keep_simplified_leaves_simplified_untouched() {
        let p = ConversionProfile::ToGovernmentStandardKeepSimplified;
        assert_eq!(p.convert("国家"), "国家");
        assert_eq!(p.convert("爲了"), "為了");
    }

    #[test]
    fn new_glyphs_only_touches_glyph_forms() {
        let p = ConversionProfile::ToNewGlyphsKeepSimplifiedAndVariants;
        assert_eq!(p.convert("敎育眞好"), "教育真好");
        assert_eq!(p.convert("爲国"), "爲国");
    }

    #[test]
    fn all_profiles_are_idempotent_on_samples() {
        let samples = [
            "豐富的頭髮與乾坤",
            "敎育爲衆人之本",
            "国家发展里程",
            "mixed 中英文 text 123",
            "",
        ];
        for profile in ConversionProfile::ALL {
            for sample in samples {
                let once = profile.convert(sample);
                let twice = profile.convert(&once);
                assert_eq!(once, twice, "{} not idempotent on {sample:?}", profile.name());
            }
        }
    }

    #[test]
    fn cjk_detection() {
        assert!(contains_cjk("有中文"));
        assert!(contains_cjk("mixed 中 text"));
        assert!(!contains_cjk("latin only"));
        assert!(!contains_cjk(""));
        assert!(!contains_cjk("\u{3000}、。"));
    }
}
