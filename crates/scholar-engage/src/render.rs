//! Marksheet render parser.
//!
//! A render is an opaque blob in which Engage lays out one row per mark. The
//! parser recovers records by sequential pattern search. Every extraction
//! returns the offset just past what it consumed, so a caller can resume on
//! the same buffer to recover the next record.
//!
//! A mark row looks like `\t87, Mathematics, Mr Smith<`: a tab-prefixed
//! percentage, the subject between the next two commas and the teacher after
//! the last comma before the next `<`. Rows that break this layout are
//! reported as [`RenderError::Structure`] rather than skipped.

use regex::Regex;
use scholar_core::Percentage;
use std::sync::LazyLock;

use crate::error::RenderError;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a>(.*?)</a>").expect("NAME_RE is a valid regex pattern"));

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Year\s(\d+)").expect("YEAR_RE is a valid regex pattern"));

// Engage escapes tabs inconsistently: accept a real tab or a literal `\t`.
static PERCENTAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\t|\\t)(\d+)").expect("PERCENTAGE_RE is a valid regex pattern")
});

/// A mark as it appears in a render, before it is tied to a pupil and period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMark {
    pub subject: String,
    pub teacher: String,
    pub percentage: Percentage,
}

/// The pupil's name and the offset just past it.
pub fn name_from_render(buf: &str) -> Result<(String, usize), RenderError> {
    let caps = NAME_RE
        .captures(buf)
        .ok_or(RenderError::NotFound { what: "name" })?;
    let whole = caps.get(0).ok_or(RenderError::NotFound { what: "name" })?;
    let name = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
    Ok((name, whole.end()))
}

/// The pupil's current year in program and the offset just past it.
///
/// Engage repeats `Year N` on every row; only the last one is current.
pub fn current_year_from_render(buf: &str) -> Result<(i32, usize), RenderError> {
    let caps = YEAR_RE
        .captures_iter(buf)
        .last()
        .ok_or(RenderError::NotFound { what: "year" })?;
    let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
        return Err(RenderError::NotFound { what: "year" });
    };
    let year = digits.as_str().parse::<i32>().map_err(|e| {
        RenderError::structure(digits.start(), format!("invalid year {:?}: {e}", digits.as_str()))
    })?;
    Ok((year, whole.end()))
}

/// The first mark at or after `offset`, and the offset to resume from.
pub fn mark_from_render(buf: &str, offset: usize) -> Result<(ParsedMark, usize), RenderError> {
    if offset > buf.len() || !buf.is_char_boundary(offset) {
        return Err(RenderError::structure(offset, "offset outside render"));
    }

    let caps = PERCENTAGE_RE
        .captures(&buf[offset..])
        .ok_or(RenderError::NotFound { what: "percentage" })?;
    let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
        return Err(RenderError::NotFound { what: "percentage" });
    };
    let percentage = digits
        .as_str()
        .parse::<i64>()
        .ok()
        .and_then(|value| Percentage::try_from(value).ok())
        .ok_or_else(|| RenderError::Percentage {
            raw: digits.as_str().to_string(),
        })?;
    let mut cursor = offset + whole.end();

    let (subject, consumed) = subject_after(buf, cursor)?;
    cursor += consumed;

    let (teacher, consumed) = teacher_after(buf, cursor)?;
    cursor += consumed;

    Ok((
        ParsedMark {
            subject,
            teacher,
            percentage,
        },
        cursor,
    ))
}

/// Text between the next two commas; stops on the second comma.
fn subject_after(buf: &str, at: usize) -> Result<(String, usize), RenderError> {
    let rest = &buf[at..];
    let first = rest
        .find(',')
        .ok_or_else(|| RenderError::structure(at, "no comma after percentage"))?;
    let mut start = first + 1;
    if rest[start..].starts_with(' ') {
        start += 1;
    }
    let len = rest[start..]
        .find(',')
        .ok_or_else(|| RenderError::structure(at + start, "no comma after subject"))?;

    let subject = rest[start..start + len].trim();
    if subject.is_empty() {
        return Err(RenderError::structure(at + start, "empty subject"));
    }
    Ok((subject.to_string(), start + len))
}

/// Text after the last comma before the next `<`; stops on the `<`.
fn teacher_after(buf: &str, at: usize) -> Result<(String, usize), RenderError> {
    let rest = &buf[at..];
    let tag = rest
        .find('<')
        .ok_or_else(|| RenderError::structure(at, "no tag after subject"))?;
    let comma = rest[..tag]
        .rfind(',')
        .ok_or_else(|| RenderError::structure(at, "no comma before teacher"))?;
    Ok((rest[comma + 1..tag].trim().to_string(), tag))
}

/// Every mark in the render, in order.
///
/// Stops at the first structural error; partial results are discarded.
pub fn marks_from_render(buf: &str) -> Result<Vec<ParsedMark>, RenderError> {
    let mut scanner = RenderScanner::new(buf);
    let mut marks = Vec::new();
    while let Some((mark, _)) = scanner.next_mark()? {
        marks.push(mark);
    }
    Ok(marks)
}

/// Cursor over the marks of one render.
#[derive(Debug, Clone)]
pub struct RenderScanner<'a> {
    buf: &'a str,
    offset: usize,
}

impl<'a> RenderScanner<'a> {
    #[must_use]
    pub fn new(buf: &'a str) -> Self {
        Self { buf, offset: 0 }
    }

    /// Resume scanning from a previously returned offset.
    #[must_use]
    pub fn resume(buf: &'a str, offset: usize) -> Self {
        Self { buf, offset }
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Next mark and its resume offset, or `None` once no percentage is left.
    pub fn next_mark(&mut self) -> Result<Option<(ParsedMark, usize)>, RenderError> {
        match mark_from_render(self.buf, self.offset) {
            Ok((mark, resume)) => {
                self.offset = resume;
                Ok(Some((mark, resume)))
            }
            Err(RenderError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_core::ErrorKind;

    const ROW_MATHS: &str = "<tr><td>\t87, Mathematics, Mr Smith</td></tr>";
    const ROW_PHYSICS: &str = "<tr><td>\\t64, Physics, Dr Jones</td></tr>";

    fn pct(value: i64) -> Percentage {
        Percentage::try_from(value).unwrap()
    }

    mod header_tests {
        use super::*;

        #[test]
        fn test_name() {
            let buf = "<div><a>Ana Popescu</a><a>Other</a></div>";
            let (name, end) = name_from_render(buf).unwrap();
            assert_eq!(name, "Ana Popescu");
            assert_eq!(&buf[end..end + 3], "<a>");
        }

        #[test]
        fn test_name_missing() {
            let err = name_from_render("<div>nobody</div>").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }

        #[test]
        fn test_current_year_takes_last() {
            let buf = "Year 9 ... Year 10 ... Year 11</td>";
            let (year, end) = current_year_from_render(buf).unwrap();
            assert_eq!(year, 11);
            assert_eq!(&buf[end..], "</td>");
        }

        #[test]
        fn test_current_year_missing() {
            let err = current_year_from_render("<a>Ana</a>").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
    }

    mod mark_tests {
        use super::*;

        #[test]
        fn test_single_mark() {
            let (mark, end) = mark_from_render(ROW_MATHS, 0).unwrap();
            assert_eq!(
                mark,
                ParsedMark {
                    subject: "Mathematics".into(),
                    teacher: "Mr Smith".into(),
                    percentage: pct(87),
                }
            );
            assert_eq!(&ROW_MATHS[end..], "</td></tr>");
        }

        #[test]
        fn test_escaped_tab() {
            let (mark, _) = mark_from_render(ROW_PHYSICS, 0).unwrap();
            assert_eq!(mark.percentage, pct(64));
            assert_eq!(mark.subject, "Physics");
            assert_eq!(mark.teacher, "Dr Jones");
        }

        #[test]
        fn test_resume_recovers_second_record() {
            let blob = format!("{ROW_MATHS}{ROW_PHYSICS}");
            let (first, resume) = mark_from_render(&blob, 0).unwrap();
            let (second, _) = mark_from_render(&blob, resume).unwrap();
            let (alone, _) = mark_from_render(ROW_PHYSICS, 0).unwrap();

            assert_eq!(first.subject, "Mathematics");
            assert_eq!(second, alone);
        }

        #[test]
        fn test_out_of_range_percentage_is_invalid() {
            let err = mark_from_render("\t140, Art, Ms Lee<", 0).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Invalid);

            let err = mark_from_render("\t99999999999999999999, Art, Ms Lee<", 0).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Invalid);
        }

        #[test]
        fn test_missing_boundaries_are_structural() {
            for buf in ["\t50 Art Ms Lee<", "\t50, Art Ms Lee<", "\t50, Art, Ms Lee"] {
                let err = mark_from_render(buf, 0).unwrap_err();
                assert!(
                    matches!(err, RenderError::Structure { .. }),
                    "{buf:?} gave {err:?}"
                );
                assert_eq!(err.kind(), ErrorKind::Internal);
            }
        }

        #[test]
        fn test_no_percentage_is_not_found() {
            let err = mark_from_render("<a>Ana</a>", 0).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }

        #[test]
        fn test_offset_past_end() {
            let err = mark_from_render(ROW_MATHS, ROW_MATHS.len() + 1).unwrap_err();
            assert!(matches!(err, RenderError::Structure { .. }));
        }
    }

    mod scanner_tests {
        use super::*;

        #[test]
        fn test_scanner_walks_all_marks() {
            let blob = format!("<a>Ana</a> Year 10 {ROW_MATHS}{ROW_PHYSICS}</table>");
            let marks = marks_from_render(&blob).unwrap();
            let subjects: Vec<_> = marks.iter().map(|m| m.subject.as_str()).collect();
            assert_eq!(subjects, ["Mathematics", "Physics"]);
        }

        #[test]
        fn test_scanner_reports_resume_offsets() {
            let blob = format!("{ROW_MATHS}{ROW_PHYSICS}");
            let mut scanner = RenderScanner::new(&blob);

            let (_, first_end) = scanner.next_mark().unwrap().unwrap();
            assert_eq!(scanner.offset(), first_end);

            let mut resumed = RenderScanner::resume(&blob, first_end);
            let (from_resume, _) = resumed.next_mark().unwrap().unwrap();
            let (from_scanner, _) = scanner.next_mark().unwrap().unwrap();
            assert_eq!(from_resume, from_scanner);

            assert!(scanner.next_mark().unwrap().is_none());
        }

        #[test]
        fn test_scanner_aborts_on_structure_error() {
            let blob = format!("{ROW_MATHS}\t12 broken");
            assert!(marks_from_render(&blob).is_err());
        }

        #[test]
        fn test_empty_render_has_no_marks() {
            assert!(marks_from_render("").unwrap().is_empty());
        }
    }
}
