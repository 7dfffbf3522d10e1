use memchr::memchr;
use smallvec::SmallVec;

/// Stand-in for `%d`. Parses as a numeric literal.
pub const NUMBER_SENTINEL: &str = "-999";
/// Stand-in for `%v`. Parses as an identifier.
pub const VALUE_SENTINEL: &str = "_DUMMY_VALUE_";
/// Stand-in for `%s`. Parses as an identifier.
pub const STRING_SENTINEL: &str = "_DUMMY_STRING_";

/// Every verb [`mask`] replaces, in the order [`unmask`] restores them.
pub const VERBS: [Verb; 3] = [Verb::Decimal, Verb::Value, Verb::String];

/// A printf verb that survives SQL formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Decimal,
    Value,
    String,
}

impl Verb {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'd' => Some(Verb::Decimal),
            b'v' => Some(Verb::Value),
            b's' => Some(Verb::String),
            _ => None,
        }
    }

    pub fn sentinel(self) -> &'static str {
        match self {
            Verb::Decimal => NUMBER_SENTINEL,
            Verb::Value => VALUE_SENTINEL,
            Verb::String => STRING_SENTINEL,
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Verb::Decimal => "%d",
            Verb::Value => "%v",
            Verb::String => "%s",
        }
    }
}

/// Replace every `%d`, `%v` and `%s` with its sentinel in a single pass.
///
/// A `%` puts the scanner in verb mode and the next character always leaves
/// it, so `%%d` is kept as-is rather than read as `%` followed by `%d`. Any
/// verb other than the three above is copied through untouched; if the SQL
/// formatter chokes on it, that surfaces as an ordinary formatting error.
pub fn mask(sql: &str) -> String {
    mask_verbs(sql).0
}

/// Like [`mask`], also returning the distinct verbs that were replaced.
pub fn mask_verbs(sql: &str) -> (String, SmallVec<[Verb; 3]>) {
    let mut used: SmallVec<[Verb; 3]> = SmallVec::new();
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len() + 16);
    let mut i = 0;

    while let Some(offset) = memchr(b'%', &bytes[i..]) {
        let pct = i + offset;
        out.push_str(&sql[i..pct]);
        match bytes.get(pct + 1) {
            Some(&b) => match Verb::from_byte(b) {
                Some(verb) => {
                    if !used.contains(&verb) {
                        used.push(verb);
                    }
                    out.push_str(verb.sentinel());
                    i = pct + 2;
                }
                None => {
                    // The exiting character may be multi-byte; copy it whole.
                    let next = sql[pct + 1..]
                        .chars()
                        .next()
                        .map(char::len_utf8)
                        .unwrap_or(1);
                    out.push_str(&sql[pct..pct + 1 + next]);
                    i = pct + 1 + next;
                }
            },
            None => {
                out.push('%');
                i = pct + 1;
            }
        }
    }
    out.push_str(&sql[i..]);
    (out, used)
}

/// Restore the placeholders replaced by [`mask`].
///
/// Replacement order is fixed: numeric, value, then string sentinel. The
/// formatter must not alter or split the sentinels; that is not checked.
pub fn unmask(sql: &str) -> String {
    unmask_verbs(sql, &VERBS)
}

/// Restore only the given verbs' sentinels, in the fixed order. A sentinel
/// whose verb never occurred in the template is left as ordinary SQL.
pub fn unmask_verbs(sql: &str, verbs: &[Verb]) -> String {
    VERBS
        .iter()
        .filter(|verb| verbs.contains(verb))
        .fold(sql.to_string(), |acc, verb| {
            acc.replace(verb.sentinel(), verb.placeholder())
        })
}
