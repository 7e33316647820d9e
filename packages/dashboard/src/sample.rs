//! Built-in sample dataset shown when the backend is unreachable.

use chrono::{DateTime, TimeDelta, Utc};
use sentinel_occurrence_models::OccurrenceRecord;

/// Eight occurrences spread from 30 minutes to 45 days before `now`, so
/// every preset window has something to show.
#[must_use]
pub fn sample_occurrences(now: DateTime<Utc>) -> Vec<OccurrenceRecord> {
    [
        (
            "Possível caso de assédio reportado",
            "ASSEDIO",
            "ABERTO",
            TimeDelta::minutes(30),
        ),
        (
            "Furto de equipamento detectado",
            "FURTO",
            "EM_ANDAMENTO",
            TimeDelta::hours(2),
        ),
        (
            "Agressão no vagão",
            "AGRESSAO",
            "RESOLVIDO",
            TimeDelta::days(1),
        ),
        (
            "Vendedor ambulante na plataforma",
            "VENDEDOR_AMBULANTE",
            "ABERTO",
            TimeDelta::days(3),
        ),
        (
            "Perturbação do sossego",
            "PERTURBACAO",
            "EM_ANDAMENTO",
            TimeDelta::days(7),
        ),
        (
            "Assédio no local de trabalho",
            "ASSEDIO",
            "RESOLVIDO",
            TimeDelta::days(15),
        ),
        (
            "Furto de material de escritório",
            "FURTO",
            "ABERTO",
            TimeDelta::days(20),
        ),
        (
            "Objetos suspeitos encontrados",
            "OBJETOS_SUSPEITOS",
            "EM_ANDAMENTO",
            TimeDelta::days(45),
        ),
    ]
    .into_iter()
    .map(|(title, code, status, age)| OccurrenceRecord::new(title, code, status, now - age))
    .collect()
}
