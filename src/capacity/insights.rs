//! Aggregate insights over capacity rows.
//!
//! Pure function of its input, recomputed on every call and never stored.

use serde::Serialize;

use super::CapacityRow;

/// Label used for the international tally in project totals.
pub const INTERNATIONAL_LABEL: &str = "International";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPerformer {
    pub first_name: String,
    pub last_name: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectTotal {
    pub label: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleShare {
    pub role: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsSummary {
    pub total_reps: usize,
    pub total_sales: f64,
    pub avg_sales: f64,
    pub top_performer: TopPerformer,
    /// Per-role totals followed by the international tally.
    pub project_totals: Vec<ProjectTotal>,
    /// Share of each role in the combined role total.
    pub capacity_distribution: Vec<RoleShare>,
}

/// Summarize the capacity rows. `None` for empty input.
pub fn summarize(rows: &[CapacityRow]) -> Option<InsightsSummary> {
    let first = rows.first()?;

    let total_reps = rows.len();
    let total_sales: f64 = rows.iter().map(|r| r.sales).sum();
    let avg_sales = total_sales / total_reps as f64;

    // Strict '>' keeps the first of equal sales.
    let top = rows
        .iter()
        .skip(1)
        .fold(first, |best, row| if row.sales > best.sales { row } else { best });

    let mut role_totals: Vec<(String, u64)> = Vec::new();
    for row in rows {
        for rc in &row.role_counts {
            match role_totals.iter_mut().find(|(role, _)| *role == rc.role) {
                Some((_, total)) => *total += rc.count,
                None => role_totals.push((rc.role.clone(), rc.count)),
            }
        }
    }
    let international: u64 = rows.iter().map(|r| r.international_projects).sum();
    let all_roles: u64 = role_totals.iter().map(|(_, total)| total).sum();

    let capacity_distribution = role_totals
        .iter()
        .map(|(role, total)| RoleShare {
            role: role.clone(),
            percentage: percentage(*total, all_roles),
        })
        .collect();

    let mut project_totals: Vec<ProjectTotal> = role_totals
        .into_iter()
        .map(|(label, total)| ProjectTotal { label, total })
        .collect();
    project_totals.push(ProjectTotal {
        label: INTERNATIONAL_LABEL.to_string(),
        total: international,
    });

    Some(InsightsSummary {
        total_reps,
        total_sales,
        avg_sales,
        top_performer: TopPerformer {
            first_name: top.first_name.clone(),
            last_name: top.last_name.clone(),
            sales: top.sales,
        },
        project_totals,
        capacity_distribution,
    })
}

/// `100 * part / whole`, or 0 when `whole` is 0.
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::RoleCount;

    fn rep(first: &str, sales: f64, counts: &[(&str, u64)], intl: u64) -> CapacityRow {
        CapacityRow {
            first_name: first.to_string(),
            last_name: "Rep".to_string(),
            sales,
            role_counts: counts
                .iter()
                .map(|(role, count)| RoleCount {
                    role: role.to_string(),
                    count: *count,
                })
                .collect(),
            international_projects: intl,
        }
    }

    #[test]
    fn test_empty_is_none() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_totals_and_average() {
        let rows = vec![
            rep("John", 1000.0, &[("Admin", 2)], 0),
            rep("Jane", 2000.0, &[("Admin", 1)], 0),
        ];
        let summary = summarize(&rows).unwrap();

        assert_eq!(summary.total_reps, 2);
        assert_eq!(summary.total_sales, 3000.0);
        assert_eq!(summary.avg_sales, 1500.0);
        assert_eq!(summary.top_performer.first_name, "Jane");
        assert_eq!(summary.top_performer.sales, 2000.0);
    }

    #[test]
    fn test_top_performer_tie_keeps_first() {
        let rows = vec![
            rep("Early", 500.0, &[], 0),
            rep("Late", 500.0, &[], 0),
            rep("Low", 100.0, &[], 0),
        ];
        assert_eq!(summarize(&rows).unwrap().top_performer.first_name, "Early");
    }

    #[test]
    fn test_role_totals_and_percentages() {
        let rows = vec![
            rep("A", 10.0, &[("Admin", 1), ("Prod Spec", 2), ("Team Lead", 0)], 3),
            rep("B", 20.0, &[("Admin", 1), ("Prod Spec", 0), ("Team Lead", 4)], 1),
        ];
        let summary = summarize(&rows).unwrap();

        let totals: Vec<(&str, u64)> = summary
            .project_totals
            .iter()
            .map(|t| (t.label.as_str(), t.total))
            .collect();
        assert_eq!(
            totals,
            vec![("Admin", 2), ("Prod Spec", 2), ("Team Lead", 4), ("International", 4)]
        );

        let shares: Vec<f64> = summary
            .capacity_distribution
            .iter()
            .map(|s| s.percentage)
            .collect();
        assert_eq!(shares, vec![25.0, 25.0, 50.0]);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let rows = vec![
            rep("A", 1.0, &[("Admin", 1), ("Prod Spec", 1), ("Sr. Prod", 1)], 0),
            rep("B", 2.0, &[("Admin", 0), ("Prod Spec", 3), ("Sr. Prod", 1)], 0),
        ];
        let summary = summarize(&rows).unwrap();
        let sum: f64 = summary.capacity_distribution.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_role_total_gives_zero_percentages() {
        let rows = vec![rep("A", 1.0, &[("Admin", 0), ("Prod Spec", 0)], 5)];
        let summary = summarize(&rows).unwrap();
        assert!(summary
            .capacity_distribution
            .iter()
            .all(|s| s.percentage == 0.0));
        // International projects don't count toward role capacity.
        assert_eq!(summary.project_totals.last().unwrap().total, 5);
    }
}
