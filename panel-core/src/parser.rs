use nom::bytes::complete::take_till;
use nom::character::complete::char;
use nom::combinator::all_consuming;
use nom::multi::separated_list0;
use nom::IResult;
use nom::Parser;

/// Splits a comma-separated tag input into its raw segments, without any trimming.
pub fn parse_tag_list(input: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(separated_list0(char(','), take_till(|c: char| c == ','))).parse(input)
}

/// Normalizes a single tag: surrounding whitespace and leading `#` are removed.
///
/// Returns `None` when nothing is left.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().trim_start_matches('#').trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    }
}

/// Parses tags the way they are typed in the entry form, e.g. `"a, #b ,c"`.
pub fn parse_tags(input: &str) -> Vec<String> {
    match parse_tag_list(input) {
        Ok((_, segments)) => segments.into_iter().filter_map(normalize_tag).collect(),
        // take_till never fails on complete input, keep the whole string as one tag
        Err(_) => normalize_tag(input).into_iter().collect(),
    }
}
