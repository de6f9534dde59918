//! Repair of glued words in stored wiki intros

use super::WikiInfoMap;
use regex::Regex;
use std::sync::OnceLock;

/// Case boundaries and letter/digit boundaries
const BOUNDARY_RULES: &[(&str, &str)] = &[
    (r"([a-z])([A-Z][a-z])", "${1} ${2}"),
    (r"([a-z])(\d)", "${1} ${2}"),
    (r"(\d)([a-z])", "${1} ${2}"),
];

/// Word pairs seen glued together in intro text
const GLUED_WORD_RULES: &[(&str, &str)] = &[
    (r"groupformed", "group formed"),
    (r"bandformed", "band formed"),
    (r"inall", "in all"),
    (r"formerand", "former and"),
    (r"boyband", "boy band"),
    (r"girlgroup", "girl group"),
    (r"duoformed", "duo formed"),
    (r"albumtrilogy", "album trilogy"),
    (r"albumtetralogy", "album tetralogy"),
    (r"groupis", "group is"),
    (r"groupconsists", "group consists"),
    (r"groupcurrently", "group currently"),
    (r"groupwas", "group was"),
    (r"bandis", "band is"),
    (r"bandconsists", "band consists"),
    (r"withthe", "with the"),
    (r"andthe", "and the"),
    (r"fromthe", "from the"),
    (r"forthe", "for the"),
    (r"onthe", "on the"),
    (r"tothe", "to the"),
    (r"atthe", "at the"),
    (r"asthe", "as the"),
    (r"bythe", "by the"),
    (r"isthe", "is the"),
    (r"wasthe", "was the"),
    (r"ofthe", "of the"),
    (r"inthe", "in the"),
    (r"throughthe", "through the"),
    (r"titletrack", "title track"),
    (r"theireponymous", "their eponymous"),
    (r"eponymousdebut", "eponymous debut"),
    (r"thesame", "the same"),
    (r"leadsingles", "lead singles"),
    (r"leadsingle", "lead single"),
    (r"albumand", "album and"),
    (r"musican", "music an"),
    (r"albumsold", "album sold"),
    (r"EPsold", "EP sold"),
    (r"singlealbum", "single album"),
    (r"studioalbum", "studio album"),
    (r"albumwas", "album was"),
    (r"EPwas", "EP was"),
    (r"firstalbum", "first album"),
    (r"debutalbum", "debut album"),
    (r"firstEP", "first EP"),
    (r"debutEP", "debut EP"),
    (r"extendedplay", "extended play"),
    (r"digitalsingles", "digital singles"),
    (r"digitalsingle", "digital single"),
    (r"debutsingle", "debut single"),
    (r"singlesold", "single sold"),
    (r"musicvideo", "music video"),
    (r"theirown", "their own"),
    (r"bandmember", "band member"),
    (r"groupmember", "group member"),
    (r"formermember", "former member"),
    (r"maxisingle", "maxi single"),
    (r"andwas", "and was"),
    (r"andis", "and is"),
    (r"tobecome", "to become"),
    (r"albumwith", "album with"),
    (r"albumin", "album in"),
    (r"albumat", "album at"),
    (r"chartfor", "chart for"),
    (r"chartand", "chart and"),
    (r"chartat", "chart at"),
    (r"chartin", "chart in"),
    (r"BillboardHot", "Billboard Hot"),
    (r"BillboardGlobal", "Billboard Global"),
    (r"BillboardWorld", "Billboard World"),
    (r"BillboardK-pop", "Billboard K-pop"),
    (r"BillboardTop", "Billboard Top"),
    (r"Billboard200", "Billboard 200"),
    (r"K-popHot", "K-pop Hot"),
    (r"BillboardEmerging", "Billboard Emerging"),
    (r"K-popgroup", "K-pop group"),
    (r"K-popacross", "K-pop across"),
    (r"K-popgirl", "K-pop girl"),
    (r"K-popboy", "K-pop boy"),
    (r"K-popmale", "K-pop male"),
    (r"K-popfemale", "K-pop female"),
    (r"K-popact", "K-pop act"),
    (r"K-popscene", "K-pop scene"),
    (r"K-popartist", "K-pop artist"),
    (r"ForbesKorea", "Forbes Korea"),
    (r"CircleDigital", "Circle Digital"),
    (r"CircleAlbum", "Circle Album"),
    (r"GoldenDisc", "Golden Disc"),
    (r"SeoulMusic", "Seoul Music"),
    (r"MelonMusic", "Melon Music"),
    (r"MnetAsian", "Mnet Asian"),
    (r"GaonDigital", "Gaon Digital"),
    (r"GaonAlbum", "Gaon Album"),
    (r"OrionAlbums", "Orion Albums"),
    (r"OrionSingles", "Orion Singles"),
    (r"UKSingles", "UK Singles"),
    (r"UKOfficial", "UK Official"),
    (r"USBillboard", "US Billboard"),
    (r"inK-pop", "in K-pop"),
    (r"ofK-pop", "of K-pop"),
    (r"therecord", "the record"),
    (r"millioncopies", "million copies"),
    (r"millionsales", "million sales"),
    (r"millionunit", "million unit"),
    (r"milliondigital", "million digital"),
    (r"worldtour", "world tour"),
    (r"hometour", "home tour"),
    (r"KoreanWave", "Korean Wave"),
    (r"SouthKorean", "South Korean"),
];

fn rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        BOUNDARY_RULES
            .iter()
            .chain(GLUED_WORD_RULES)
            .map(|(pattern, replacement)| {
                (Regex::new(pattern).expect("spacing rule is valid"), *replacement)
            })
            .collect()
    })
}

/// Apply every spacing rule in order
pub fn fix_spacing(text: &str) -> String {
    let mut fixed = text.to_string();
    for (pattern, replacement) in rules() {
        fixed = pattern.replace_all(&fixed, *replacement).into_owned();
    }
    fixed
}

/// Fix every intro paragraph in place, returning how many changed
pub fn fix_group_info(groups: &mut WikiInfoMap) -> usize {
    let mut changed = 0;

    for info in groups.values_mut().filter_map(|group| group.info.as_mut()) {
        for paragraph in info.iter_mut() {
            let fixed = fix_spacing(paragraph);
            if fixed != *paragraph {
                *paragraph = fixed;
                changed += 1;
            }
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::{GroupWikiInfo, NameUsed};

    #[test]
    fn test_boundaries() {
        assert_eq!(fix_spacing("aespaIs"), "aespa Is");
        assert_eq!(fix_spacing("debuted in2020"), "debuted in 2020");
        assert_eq!(fix_spacing("4members"), "4 members");
    }

    #[test]
    fn test_glued_words() {
        assert_eq!(
            fix_spacing("ITZY is a SouthKorean girlgroupformed by JYP"),
            "ITZY is a South Korean girl group formed by JYP"
        );
        assert_eq!(fix_spacing("peaked on theBillboard200"), "peaked on the Billboard 200");
    }

    #[test]
    fn test_clean_text_unchanged() {
        let text = "IVE is a South Korean girl group formed by Starship Entertainment.";
        assert_eq!(fix_spacing(text), text);
        assert_eq!(fix_spacing(""), "");
    }

    #[test]
    fn test_fix_group_info_skips_missing_info() {
        let mut groups = WikiInfoMap::new();
        groups.insert(
            "ITZY".to_string(),
            GroupWikiInfo {
                info: Some(vec!["girlgroup".to_string(), "fine".to_string()]),
                name_used: Some(NameUsed::English),
                url: Some("https://en.wikipedia.org/wiki/Itzy".to_string()),
            },
        );
        groups.insert("Unknown".to_string(), GroupWikiInfo::default());

        assert_eq!(fix_group_info(&mut groups), 1);
        assert_eq!(groups["ITZY"].info.as_ref().unwrap()[0], "girl group");
        assert_eq!(groups["Unknown"].info, None);
    }
}
