//! Generic-aware parsing of `type [name], …` lists.

use thiserror::Error;

use crate::scanner::{Mode, Scanner, Unit, UnitKind};

/// One entry of an argument or type list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Type text with whitespace collapsed, modifiers and annotations removed.
    pub ty: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("malformed argument list at offset {at}")]
pub struct MalformedArgument {
    pub at: usize,
}

const MODIFIERS: &[&str] = &["final"];

/// Parse the list between `begin` and `end` (both exclusive of any delimiters).
///
/// With `only_type` every entry is a bare type (`extends A, B<C>`); otherwise each entry must end
/// in a plain identifier naming it (`int a, Map<K, V> m`). C-style dimensions after a name
/// (`int a[]`) are moved onto the type.
pub fn parse_arg_list(
    sc: &Scanner<'_>,
    begin: usize,
    end: usize,
    only_type: bool,
) -> Result<Vec<Arg>, MalformedArgument> {
    let mut args = Vec::new();
    if sc.skip_trivia_back_to(end, begin) <= begin {
        return Ok(args);
    }

    let mut pos = end;
    loop {
        let (arg, next) = parse_one(sc, begin, pos, only_type)?;
        args.push(arg);
        match next {
            Some(comma) => pos = comma,
            None => break,
        }
    }
    args.reverse();
    Ok(args)
}

/// Parse the entry ending at `end`. Returns it and, when a separating comma precedes it, the
/// offset of that comma.
fn parse_one(
    sc: &Scanner<'_>,
    begin: usize,
    end: usize,
    only_type: bool,
) -> Result<(Arg, Option<usize>), MalformedArgument> {
    let mut pos = end;
    let mut name = None;
    let mut dims = 0;

    if !only_type {
        while let Some(unit) = sc.prev_unit(pos, Mode::Angle, begin) {
            if unit.kind != UnitKind::Group('[') {
                break;
            }
            dims += 1;
            pos = unit.start;
        }
        let unit = sc
            .prev_unit(pos, Mode::Normal, begin)
            .filter(|unit| unit.kind == UnitKind::Ident)
            .ok_or(MalformedArgument { at: pos })?;
        if matches!(sc.text()[..unit.start].chars().next_back(), Some('.' | '@')) {
            return Err(MalformedArgument { at: unit.start });
        }
        name = Some(sc.slice(unit.start, unit.end).to_owned());
        pos = unit.start;
    }

    let mut units = Vec::new();
    let mut comma = None;
    loop {
        let Some(unit) = sc.prev_unit(pos, Mode::Angle, begin) else {
            // Either `begin` was reached or an unbalanced closer stopped the scan.
            if sc.skip_trivia_back_to(pos, begin) > begin {
                return Err(MalformedArgument { at: pos });
            }
            break;
        };
        match unit.kind {
            UnitKind::Punct(',') => {
                comma = Some(unit.start);
                break;
            }
            UnitKind::Ident | UnitKind::Group('(' | '[' | '<') => {
                units.push(unit);
                pos = unit.start;
            }
            _ => return Err(MalformedArgument { at: unit.start }),
        }
    }
    units.reverse();

    let mut ty = type_text(sc, &units).ok_or(MalformedArgument { at: pos })?;
    for _ in 0..dims {
        ty.push_str("[]");
    }
    Ok((Arg { ty, name }, comma))
}

/// Joins the units that make up the type proper, dropping modifiers and annotations.
fn type_text(sc: &Scanner<'_>, units: &[Unit]) -> Option<String> {
    let mut segments: Vec<(usize, usize)> = Vec::new();
    let mut contiguous = false;
    let mut idx = 0;
    while idx < units.len() {
        let unit = units[idx];
        let text = sc.slice(unit.start, unit.end);
        if unit.kind == UnitKind::Ident && (text.starts_with('@') || MODIFIERS.contains(&text)) {
            idx += 1;
            if text.starts_with('@')
                && units
                    .get(idx)
                    .is_some_and(|next| next.kind == UnitKind::Group('('))
            {
                idx += 1;
            }
            contiguous = false;
            continue;
        }
        match segments.last_mut() {
            Some(segment) if contiguous => segment.1 = unit.end,
            _ => segments.push((unit.start, unit.end)),
        }
        contiguous = true;
        idx += 1;
    }

    if segments.is_empty() {
        return None;
    }
    let parts: Vec<String> = segments
        .into_iter()
        .map(|(start, end)| sc.normalized_text(start, end))
        .collect();
    Some(parts.join(" "))
}
