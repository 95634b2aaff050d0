//! Vue 2 filter sequences: `expr | name(args) | other`.

use sfumato_carton::SourceRange;

/// A piece of the original text with its template span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub offset: u32,
}

impl<'a> Segment<'a> {
    fn new(source: &'a str, start: usize, end: usize, base: u32) -> Self {
        Self {
            text: &source[start..end],
            offset: base + start as u32,
        }
    }

    pub fn range(&self) -> SourceRange {
        SourceRange::new(self.offset, self.offset + self.text.len() as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter<'a> {
    pub name: Segment<'a>,
    /// Text between the call parentheses, if the filter is called
    pub arguments: Option<Segment<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSequence<'a> {
    pub expression: Segment<'a>,
    pub filters: Vec<Filter<'a>>,
}

/// Split `text`, found at `offset`, at its top-level filter bars.
///
/// Returns `None` when there is no filter. A bar counts when it is not half
/// of `||` and sits outside strings, template literals and brackets.
pub fn split_filters(text: &str, offset: u32) -> Option<FilterSequence<'_>> {
    let bars = filter_bars(text);
    if bars.is_empty() {
        return None;
    }

    let expression = Segment::new(text, 0, bars[0], offset);
    let filters = bars
        .iter()
        .enumerate()
        .map(|(i, &bar)| {
            let end = bars.get(i + 1).copied().unwrap_or(text.len());
            parse_filter(text, bar + 1, end, offset)
        })
        .collect();

    Some(FilterSequence {
        expression,
        filters,
    })
}

fn filter_bars(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut bars = Vec::new();
    let mut quote: Option<u8> = None;
    let mut depth = 0i32;

    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if let Some(q) = quote {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match c {
            b'\'' | b'"' | b'`' => quote = Some(c),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'|' if depth == 0 => {
                let prev = i.checked_sub(1).map(|p| bytes[p]);
                let next = bytes.get(i + 1).copied();
                if prev != Some(b'|') && next != Some(b'|') {
                    bars.push(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    bars
}

fn parse_filter(text: &str, start: usize, end: usize, base: u32) -> Filter<'_> {
    let piece = &text[start..end];
    let lead = piece.len() - piece.trim_start().len();
    let trimmed = piece.trim();
    let name_start = start + lead;

    match trimmed.find('(') {
        Some(open) => {
            let close = trimmed.rfind(')').filter(|&c| c > open).unwrap_or(trimmed.len());
            let name = trimmed[..open].trim_end();
            Filter {
                name: Segment::new(text, name_start, name_start + name.len(), base),
                arguments: Some(Segment::new(
                    text,
                    name_start + open + 1,
                    name_start + close,
                    base,
                )),
            }
        }
        None => Filter {
            name: Segment::new(text, name_start, name_start + trimmed.len(), base),
            arguments: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter() {
        assert!(split_filters("a || b", 0).is_none());
        assert!(split_filters("'a | b'", 0).is_none());
        assert!(split_filters("f(a | b)", 0).is_none());
        assert!(split_filters("`${a | b}`", 0).is_none());
    }

    #[test]
    fn test_simple_filters() {
        let Some(seq) = split_filters(" msg | capitalize | truncate(10, '|') ", 3) else {
            panic!("Expected a filter sequence");
        };
        assert_eq!(seq.expression.text, " msg ");
        assert_eq!(seq.expression.offset, 3);
        assert_eq!(seq.filters.len(), 2);

        assert_eq!(seq.filters[0].name.text, "capitalize");
        assert_eq!(seq.filters[0].name.offset, 3 + 7);
        assert!(seq.filters[0].arguments.is_none());

        let truncate = &seq.filters[1];
        assert_eq!(truncate.name.text, "truncate");
        let Some(args) = truncate.arguments else {
            panic!("Expected arguments");
        };
        assert_eq!(args.text, "10, '|'");
        assert_eq!(args.offset, 3 + 29);
        assert_eq!(args.range().len(), 7);
    }

    #[test]
    fn test_bitwise_or_inside_parens_is_not_a_filter() {
        let Some(seq) = split_filters("(a | b) | f", 0) else {
            panic!("Expected a filter sequence");
        };
        assert_eq!(seq.expression.text, "(a | b) ");
        assert_eq!(seq.filters[0].name.text, "f");
    }
}
