//! Clinical Codebook Module
//! Fixed lookup tables mapping REDCap export codes to display labels.

/// Visit type codes from `redcap_repeat_instrument`.
pub const TIPO_LABELS: &[(&str, &str)] = &[
    ("admisso", "Admissão"),
    ("reavaliao", "Reavaliação"),
    ("alta", "Alta"),
];

/// Department codes from `redcap_data_access_group`.
/// Labels verbatim from the clinic's codebook.
pub const SETOR_LABELS: &[(&str, &str)] = &[
    ("urogenecologia", "Urogenecologia"),
    ("musculoesqueletico", "Muscoluesqueletico"),
    ("doencas_raras", "Doenças raras"),
    ("neurologia_adulto", "Neurologia adulto"),
    ("neuropediatria", "Neuropediatria"),
];

pub const SEXO_LABELS: &[(i64, &str)] = &[(1, "Feminino"), (2, "Masculino")];

pub const ABSORVIDO_LABELS: &[(i64, &str)] = &[(1, "Sim"), (0, "Não")];

pub const MEMBRO_LABELS: &[(i64, &str)] = &[(1, "Membro superior"), (2, "Membro inferior")];

/// Discharge reason codes from `motivo_alta`.
pub const MOTIVO_ALTA_LABELS: &[(i64, &str)] = &[
    (1, "Alta por término do programa de reabilitação"),
    (2, "Alta por abandono"),
    (3, "Alta por evasão"),
    (4, "Alta por intercorrência clínica ou social"),
    (5, "Alta a pedido"),
    (6, "Alta óbito"),
    (7, "Alta por falta"),
];

/// Month names indexed by month number minus one.
pub const MESES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Columns that identify a patient; stripped from display and export.
pub const IDENTIFIER_COLUMNS: [&str; 3] = ["record_id", "prontuario", "nome_paciente"];

/// Look up the label for a string-keyed code.
pub fn label_for_str(
    table: &'static [(&'static str, &'static str)],
    code: &str,
) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, label)| *label)
}

/// Look up the label for an integer-keyed code.
pub fn label_for_code(table: &'static [(i64, &'static str)], code: i64) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, label)| *label)
}

/// Portuguese name for a 1-based month number.
pub fn mes_nome(mes: i32) -> Option<&'static str> {
    if (1..=12).contains(&mes) {
        Some(MESES[(mes - 1) as usize])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn visit_type_codes_map_to_labels() {
        assert_eq!(label_for_str(TIPO_LABELS, "admisso"), Some("Admissão"));
        assert_eq!(label_for_str(TIPO_LABELS, "reavaliao"), Some("Reavaliação"));
        assert_eq!(label_for_str(TIPO_LABELS, "alta"), Some("Alta"));
        assert_eq!(label_for_str(TIPO_LABELS, "triagem"), None);
    }

    #[test]
    fn discharge_reason_six_is_death() {
        assert_eq!(label_for_code(MOTIVO_ALTA_LABELS, 6), Some("Alta óbito"));
    }

    #[test]
    fn unmapped_discharge_reason_is_none() {
        assert_eq!(label_for_code(MOTIVO_ALTA_LABELS, 99), None);
    }

    #[test]
    fn absorbed_flag_uses_zero_for_no() {
        assert_eq!(label_for_code(ABSORVIDO_LABELS, 1), Some("Sim"));
        assert_eq!(label_for_code(ABSORVIDO_LABELS, 0), Some("Não"));
        assert_eq!(label_for_code(ABSORVIDO_LABELS, 2), None);
    }

    #[test]
    fn month_names_cover_one_through_twelve() {
        assert_eq!(mes_nome(1), Some("Janeiro"));
        assert_eq!(mes_nome(12), Some("Dezembro"));
        assert_eq!(mes_nome(0), None);
        assert_eq!(mes_nome(13), None);
    }
}
