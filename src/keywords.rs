//! Keyword extraction from headlines, no NLP dependencies.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::collections::HashSet;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    "a,about,above,after,again,against,all,am,an,and,any,are,aren't,as,at,be,because,been,before,\
     being,below,between,both,but,by,can't,cannot,could,couldn't,did,didn't,do,does,doesn't,doing,\
     don't,down,during,each,few,for,from,further,had,hadn't,has,hasn't,have,haven't,having,he,\
     he'd,he'll,he's,her,here,here's,hers,herself,him,himself,his,how,how's,i,i'd,i'll,i'm,i've,\
     if,in,into,is,isn't,it,it's,its,itself,let's,me,more,most,mustn't,my,myself,no,nor,not,of,\
     off,on,once,only,or,other,ought,our,ours,ourselves,out,over,own,same,shan't,she,she'd,\
     she'll,she's,should,shouldn't,so,some,such,than,that,that's,the,their,theirs,them,\
     themselves,then,there,there's,these,they,they'd,they'll,they're,they've,this,those,through,\
     to,too,under,until,up,very,was,wasn't,we,we'd,we'll,we're,we've,were,weren't,what,what's,\
     when,when's,where,where's,which,while,who,who's,whom,why,why's,with,won't,would,wouldn't,\
     you,you'd,you'll,you're,you've,your,yours,yourself,yourselves"
        .split(',')
        .map(str::trim)
        .collect()
});

/// Tuning knobs for keyword extraction.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeywordOptions {
    /// Words shorter than this many characters are dropped.
    pub min_length: usize,
    /// Maximum number of keywords returned.
    pub max: usize,
}

impl Default for KeywordOptions {
    fn default() -> Self {
        Self {
            min_length: 4,
            max: 10,
        }
    }
}

/// Extracts the most frequent non-stopword words across all headlines,
/// ranked by count. Ties keep first-seen order.
pub fn extract_keywords(headlines: &[String], options: &KeywordOptions) -> Vec<String> {
    let mut freq: IndexMap<String, usize> = IndexMap::new();

    for headline in headlines {
        let cleaned: String = headline
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c.is_whitespace() || c == '-' {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        for word in cleaned.split_whitespace() {
            if word.chars().count() < options.min_length || STOPWORDS.contains(word) {
                continue;
            }
            *freq.entry(singularize(word)).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(options.max)
        .map(|(word, _)| word)
        .collect()
}

// simple-case de-pluralization; stopwords are checked before this runs
fn singularize(word: &str) -> String {
    match word.strip_suffix('s') {
        Some(stem) if word.chars().count() > 4 => stem.to_string(),
        _ => word.to_string(),
    }
}
