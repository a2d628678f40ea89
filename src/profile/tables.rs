//! Static character-form mapping tables.
//!
//! Each table is a compile-time perfect-hash map from one character to its
//! target form, optionally paired with a phrase list. Phrases take
//! precedence over single characters (leftmost-longest), which is how
//! context-dependent mappings such as 乾隆 vs 乾杯 are kept correct.
//!
//! Table invariant: no value of a table is a key of the same table, and the
//! per-profile pass chains in `super` are closed under reapplication, so
//! every profile is idempotent on its own output. `tests` below checks the
//! per-table half of that invariant.

use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;
use phf::phf_map;

/// One mapping pass: a phrase list consulted first, then a character map.
pub(crate) struct Pass {
    pub(crate) phrases: &'static [(&'static str, &'static str)],
    pub(crate) chars: &'static phf::Map<char, char>,
    automaton: &'static Lazy<AhoCorasick>,
}

impl Pass {
    /// Apply this pass to `text`.
    pub(crate) fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in self.automaton.find_iter(text) {
            self.map_chars(&text[last..m.start()], &mut out);
            out.push_str(self.phrases[m.pattern().as_usize()].1);
            last = m.end();
        }
        self.map_chars(&text[last..], &mut out);
        out
    }

    fn map_chars(&self, text: &str, out: &mut String) {
        for c in text.chars() {
            out.push(self.chars.get(&c).copied().unwrap_or(c));
        }
    }
}

fn phrase_automaton(phrases: &[(&str, &str)]) -> AhoCorasick {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(phrases.iter().map(|(from, _)| *from))
        .expect("static phrase tables are valid patterns")
}

/// Old printing glyph forms normalized to the current glyph shapes.
static NEW_GLYPHS: phf::Map<char, char> = phf_map! {
    '敎' => '教',
    '淸' => '清',
    '眞' => '真',
    '靑' => '青',
    '吿' => '告',
    '兪' => '俞',
    '卽' => '即',
    '旣' => '既',
    '絶' => '絕',
};

/// Variant characters normalized to the government-standard traditional form.
static VARIANTS: phf::Map<char, char> = phf_map! {
    '爲' => '為',
    '衆' => '眾',
    '羣' => '群',
    '峯' => '峰',
    '牀' => '床',
    '裡' => '裏',
    '强' => '強',
    '着' => '著',
    '綫' => '線',
    '脚' => '腳',
    '鷄' => '雞',
    '畧' => '略',
    '菴' => '庵',
    '嶽' => '岳',
    '喫' => '吃',
    '菓' => '果',
    '砲' => '炮',
    '竝' => '並',
    '汙' => '污',
    '踪' => '蹤',
};

/// Simplified characters mapped back to their traditional forms.
///
/// Ambiguous one-to-many pairs (台/臺, 斗/鬥, 面/麵, 干/乾/幹) are left to
/// the phrase list; an unlisted ambiguous character passes through.
static SIMPLIFIED_TO_TRADITIONAL: phf::Map<char, char> = phf_map! {
    '万' => '萬', '与' => '與', '专' => '專', '东' => '東', '丰' => '豐',
    '马' => '馬', '龙' => '龍', '车' => '車', '华' => '華', '爱' => '愛',
    '国' => '國', '学' => '學', '书' => '書', '门' => '門', '长' => '長',
    '鸟' => '鳥', '语' => '語', '记' => '記', '贝' => '貝', '见' => '見',
    '风' => '風', '飞' => '飛', '电' => '電', '头' => '頭', '发' => '發',
    '几' => '幾', '后' => '後', '机' => '機', '历' => '歷', '钟' => '鐘',
    '们' => '們', '来' => '來', '个' => '個', '时' => '時', '说' => '說',
    '对' => '對', '开' => '開', '关' => '關', '里' => '裏', '经' => '經',
    '县' => '縣', '难' => '難', '欢' => '歡', '观' => '觀', '让' => '讓',
    '医' => '醫', '艺' => '藝', '严' => '嚴', '广' => '廣', '庆' => '慶',
    '应' => '應', '听' => '聽', '厅' => '廳', '湾' => '灣', '乡' => '鄉',
    '农' => '農', '动' => '動', '务' => '務', '会' => '會', '过' => '過',
    '还' => '還', '进' => '進', '这' => '這', '边' => '邊', '运' => '運',
    '远' => '遠', '选' => '選', '钱' => '錢', '银' => '銀', '铁' => '鐵',
    '录' => '錄', '点' => '點', '热' => '熱', '无' => '無', '为' => '為',
    '众' => '眾', '亿' => '億', '传' => '傳', '体' => '體', '兰' => '蘭',
    '丽' => '麗', '旧' => '舊', '药' => '藥', '苏' => '蘇', '虫' => '蟲',
    '卫' => '衛', '视' => '視', '亲' => '親', '计' => '計', '议' => '議',
    '护' => '護', '猪' => '豬', '猫' => '貓', '卖' => '賣', '买' => '買',
    '红' => '紅', '级' => '級', '纸' => '紙', '丝' => '絲', '绝' => '絕',
    '绿' => '綠', '线' => '線', '练' => '練', '组' => '組', '细' => '細',
    '终' => '終', '结' => '結', '给' => '給', '统' => '統', '继' => '繼',
    '续' => '續', '鸡' => '雞', '离' => '離', '双' => '雙', '杂' => '雜',
    '虽' => '雖', '页' => '頁', '顶' => '頂', '顺' => '順', '须' => '須',
    '领' => '領', '题' => '題', '类' => '類', '显' => '顯', '饭' => '飯',
    '馆' => '館', '鱼' => '魚', '鲜' => '鮮', '凤' => '鳳', '鸭' => '鴨',
    '鹰' => '鷹', '麦' => '麥', '净' => '淨', '余' => '餘', '业' => '業',
    '条' => '條', '张' => '張', '阳' => '陽', '阴' => '陰', '义' => '義',
    '现' => '現', '释' => '釋', '号' => '號', '标' => '標', '层' => '層',
    '岁' => '歲', '处' => '處', '节' => '節', '测' => '測', '试' => '試',
};

static TRADITIONALIZE_PHRASES: &[(&str, &str)] = &[
    ("皇后", "皇后"),
    ("公里", "公里"),
    ("里程", "里程"),
    ("头发", "頭髮"),
    ("日历", "日曆"),
    ("干燥", "乾燥"),
    ("干净", "乾淨"),
    ("干部", "幹部"),
    ("面条", "麵條"),
    ("面包", "麵包"),
];

/// Traditional characters mapped to the simplified standard.
static TRADITIONAL_TO_SIMPLIFIED: phf::Map<char, char> = phf_map! {
    '豐' => '丰', '萬' => '万', '與' => '与', '專' => '专', '東' => '东',
    '馬' => '马', '龍' => '龙', '車' => '车', '華' => '华', '愛' => '爱',
    '國' => '国', '學' => '学', '書' => '书', '門' => '门', '長' => '长',
    '鳥' => '鸟', '語' => '语', '記' => '记', '貝' => '贝', '見' => '见',
    '風' => '风', '飛' => '飞', '雲' => '云', '電' => '电', '頭' => '头',
    '髮' => '发', '發' => '发', '後' => '后', '幾' => '几', '機' => '机',
    '歷' => '历', '曆' => '历', '鐘' => '钟', '們' => '们', '來' => '来',
    '個' => '个', '時' => '时', '說' => '说', '對' => '对', '開' => '开',
    '關' => '关', '裏' => '里', '經' => '经', '縣' => '县', '難' => '难',
    '歡' => '欢', '觀' => '观', '讓' => '让', '醫' => '医', '藝' => '艺',
    '嚴' => '严', '廣' => '广', '慶' => '庆', '應' => '应', '聽' => '听',
    '廳' => '厅', '臺' => '台', '灣' => '湾', '鄉' => '乡', '農' => '农',
    '動' => '动', '務' => '务', '會' => '会', '過' => '过', '還' => '还',
    '進' => '进', '這' => '这', '邊' => '边', '運' => '运', '遠' => '远',
    '選' => '选', '錢' => '钱', '銀' => '银', '鐵' => '铁', '錄' => '录',
    '點' => '点', '熱' => '热', '無' => '无', '為' => '为', '眾' => '众',
    '億' => '亿', '傳' => '传', '體' => '体', '蘭' => '兰', '麗' => '丽',
    '舊' => '旧', '藥' => '药', '蘇' => '苏', '蟲' => '虫', '衛' => '卫',
    '視' => '视', '親' => '亲', '計' => '计', '議' => '议', '護' => '护',
    '豬' => '猪', '貓' => '猫', '賣' => '卖', '買' => '买', '紅' => '红',
    '級' => '级', '紙' => '纸', '絲' => '丝', '絕' => '绝', '綠' => '绿',
    '線' => '线', '練' => '练', '組' => '组', '細' => '细', '終' => '终',
    '結' => '结', '給' => '给', '統' => '统', '繼' => '继', '續' => '续',
    '雞' => '鸡', '離' => '离', '雙' => '双', '雜' => '杂', '雖' => '虽',
    '頁' => '页', '頂' => '顶', '順' => '顺', '須' => '须', '領' => '领',
    '題' => '题', '類' => '类', '顯' => '显', '飯' => '饭', '館' => '馆',
    '魚' => '鱼', '鮮' => '鲜', '鳳' => '凤', '鴨' => '鸭', '鷹' => '鹰',
    '麥' => '麦', '麵' => '面', '淨' => '净', '餘' => '余', '業' => '业',
    '條' => '条', '張' => '张', '陽' => '阳', '陰' => '阴', '義' => '义',
    '鬥' => '斗', '隻' => '只', '趕' => '赶', '腳' => '脚', '蹤' => '踪',
    '著' => '着', '強' => '强', '乾' => '干', '幹' => '干', '瞭' => '了',
    '藉' => '借', '現' => '现', '釋' => '释', '號' => '号', '標' => '标',
    '層' => '层', '歲' => '岁', '處' => '处', '節' => '节', '測' => '测',
    '試' => '试', '註' => '注',
};

static SIMPLIFY_PHRASES: &[(&str, &str)] = &[
    ("乾隆", "乾隆"),
    ("乾坤", "乾坤"),
    ("瞭望", "瞭望"),
    ("慰藉", "慰藉"),
    ("狼藉", "狼藉"),
];

static NO_PHRASES: &[(&str, &str)] = &[];

static NEW_GLYPH_AC: Lazy<AhoCorasick> = Lazy::new(|| phrase_automaton(NO_PHRASES));
static VARIANT_AC: Lazy<AhoCorasick> = Lazy::new(|| phrase_automaton(NO_PHRASES));
static TRADITIONALIZE_AC: Lazy<AhoCorasick> = Lazy::new(|| phrase_automaton(TRADITIONALIZE_PHRASES));
static SIMPLIFY_AC: Lazy<AhoCorasick> = Lazy::new(|| phrase_automaton(SIMPLIFY_PHRASES));

/// Normalize old printing glyph forms.
pub(crate) static NEW_GLYPH_PASS: Pass = Pass {
    phrases: NO_PHRASES,
    chars: &NEW_GLYPHS,
    automaton: &NEW_GLYPH_AC,
};

/// Normalize variant characters to government-standard traditional forms.
pub(crate) static VARIANT_PASS: Pass = Pass {
    phrases: NO_PHRASES,
    chars: &VARIANTS,
    automaton: &VARIANT_AC,
};

/// Map simplified characters back to traditional forms.
pub(crate) static TRADITIONALIZE_PASS: Pass = Pass {
    phrases: TRADITIONALIZE_PHRASES,
    chars: &SIMPLIFIED_TO_TRADITIONAL,
    automaton: &TRADITIONALIZE_AC,
};

/// Map traditional characters to the simplified standard.
pub(crate) static SIMPLIFY_PASS: Pass = Pass {
    phrases: SIMPLIFY_PHRASES,
    chars: &TRADITIONAL_TO_SIMPLIFIED,
    automaton: &SIMPLIFY_AC,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_values_are_not_keys(map: &phf::Map<char, char>) {
        for (_, v) in map.entries() {
            assert!(
                map.get(v).is_none(),
                "table value {v} is also a key; single-pass idempotence broken"
            );
        }
    }

    #[test]
    fn tables_are_idempotent_per_pass() {
        assert_values_are_not_keys(&NEW_GLYPHS);
        assert_values_are_not_keys(&VARIANTS);
        assert_values_are_not_keys(&SIMPLIFIED_TO_TRADITIONAL);
        assert_values_are_not_keys(&TRADITIONAL_TO_SIMPLIFIED);
    }

    #[test]
    fn phrase_precedence_over_chars() {
        assert_eq!(SIMPLIFY_PASS.apply("乾隆乾杯"), "乾隆干杯");
        assert_eq!(SIMPLIFY_PASS.apply("瞭望塔使人瞭然"), "瞭望塔使人了然");
    }

    #[test]
    fn traditionalize_phrases_guard_units() {
        assert_eq!(TRADITIONALIZE_PASS.apply("五公里"), "五公里");
        assert_eq!(TRADITIONALIZE_PASS.apply("头发"), "頭髮");
        assert_eq!(TRADITIONALIZE_PASS.apply("发现"), "發現");
    }

    #[test]
    fn chars_without_mapping_pass_through() {
        assert_eq!(SIMPLIFY_PASS.apply("hello, 123"), "hello, 123");
        assert_eq!(NEW_GLYPH_PASS.apply("敎育眞好"), "教育真好");
    }
}
