//! Periodic-table symbol lookups keyed by atomic number.
//!
//! Cross-section files may be named either by atomic number or by symbol, and
//! material files must reference atomic numbers inside this table.

pub const MAX_ATOMIC_NUMBER: u32 = 118;

const ELEMENT_SYMBOLS: [&str; MAX_ATOMIC_NUMBER as usize] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

pub const fn is_valid_atomic_number(atomic_number: u32) -> bool {
    atomic_number >= 1 && atomic_number <= MAX_ATOMIC_NUMBER
}

pub fn element_symbol(atomic_number: u32) -> Option<&'static str> {
    if !is_valid_atomic_number(atomic_number) {
        return None;
    }
    Some(ELEMENT_SYMBOLS[(atomic_number - 1) as usize])
}

pub fn atomic_number_for_symbol(symbol: &str) -> Option<u32> {
    let normalized = symbol.trim();
    if normalized.is_empty() {
        return None;
    }

    ELEMENT_SYMBOLS
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(normalized))
        .map(|index| index as u32 + 1)
}

/// Resolves a data-file stem such as `8`, `008` or `O` to an atomic number.
pub fn atomic_number_for_stem(stem: &str) -> Option<u32> {
    let trimmed = stem.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return trimmed
            .parse::<u32>()
            .ok()
            .filter(|value| is_valid_atomic_number(*value));
    }
    atomic_number_for_symbol(trimmed)
}
