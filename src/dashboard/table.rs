// A table over one collection: sorting, search, pagination and CSV export.

use std::cmp::Ordering;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::dashboard::*;

pub struct Column<T> {
    pub id: &'static str,
    pub header: &'static str,
    pub accessor: fn(&T) -> &str,
}

pub fn technical_columns() -> Vec<Column<TechnicalFeedback>> {
    vec![
        Column {
            id: "name",
            header: "Name",
            accessor: |t| t.name.as_str(),
        },
        Column {
            id: "tabletWorking",
            header: "Tablet Working",
            accessor: |t| t.tablet_working.as_str(),
        },
        Column {
            id: "internetProblems",
            header: "Internet Problems",
            accessor: |t| t.internet_problems.as_str(),
        },
        Column {
            id: "knowHowToUseTablet",
            header: "Know How to Use Tablet",
            accessor: |t| t.know_how_to_use_tablet.as_str(),
        },
        Column {
            id: "getHelpQuickly",
            header: "Get Help Quickly",
            accessor: |t| t.get_help_quickly.as_str(),
        },
        Column {
            id: "doctorsRespectful",
            header: "Doctors Respectful",
            accessor: |t| t.doctors_respectful.as_str(),
        },
    ]
}

pub fn clinic_columns() -> Vec<Column<ClinicWorkEnvironment>> {
    vec![
        Column {
            id: "name",
            header: "Name",
            accessor: |c| c.name.as_str(),
        },
        Column {
            id: "partnerStaffIssues",
            header: "Partner Staff Issues",
            accessor: |c| c.partner_staff_issues.as_str(),
        },
        Column {
            id: "comfortableTimings",
            header: "Comfortable Timings",
            accessor: |c| c.comfortable_timings.as_str(),
        },
        Column {
            id: "clinicClean",
            header: "Clinic Clean",
            accessor: |c| c.clinic_clean.as_str(),
        },
        Column {
            id: "feelSafe",
            header: "Feel Safe",
            accessor: |c| c.feel_safe.as_str(),
        },
        Column {
            id: "medicinesAvailable",
            header: "Medicines Available",
            accessor: |c| c.medicines_available.as_str(),
        },
        Column {
            id: "managersHelpful",
            header: "Managers Helpful",
            accessor: |c| c.managers_helpful.as_str(),
        },
        Column {
            id: "monthlyTargetCompleted",
            header: "Monthly Target Completed",
            accessor: |c| c.monthly_target_completed.as_str(),
        },
        Column {
            id: "patientsBehaveWell",
            header: "Patients Behave Well",
            accessor: |c| c.patients_behave_well.as_str(),
        },
        Column {
            id: "patientsTrustYou",
            header: "Patients Trust You",
            accessor: |c| c.patients_trust_you.as_str(),
        },
        Column {
            id: "helpDuringCamps",
            header: "Help During Camps",
            accessor: |c| c.help_during_camps.as_str(),
        },
        Column {
            id: "equipmentWorking",
            header: "Equipment Working",
            accessor: |c| c.equipment_working.as_str(),
        },
    ]
}

pub fn growth_columns() -> Vec<Column<GrowthFeedback>> {
    vec![
        Column {
            id: "name",
            header: "Name",
            accessor: |g| g.name.as_str(),
        },
        Column {
            id: "requireTraining",
            header: "Require Training",
            accessor: |g| g.require_training.as_str(),
        },
        Column {
            id: "proudOfWork",
            header: "Proud of Work",
            accessor: |g| g.proud_of_work.as_str(),
        },
        Column {
            id: "careerGrowth",
            header: "Career Growth",
            accessor: |g| g.career_growth.as_str(),
        },
        Column {
            id: "friendRecommendation",
            header: "Friend Recommendation",
            accessor: |g| g.friend_recommendation.as_str(),
        },
        Column {
            id: "clinicDistance",
            header: "Clinic Distance",
            accessor: |g| g.clinic_distance.as_str(),
        },
        Column {
            id: "additionalHelpNeeded",
            header: "Additional Help Needed",
            accessor: |g| g.additional_help_needed.as_str(),
        },
        Column {
            id: "clinicImprovementSuggestions",
            header: "Clinic Improvement Suggestions",
            accessor: |g| g.clinic_improvement_suggestions.as_str(),
        },
        Column {
            id: "feedbackForManagement",
            header: "Feedback for Management",
            accessor: |g| g.feedback_for_management.as_str(),
        },
    ]
}

/// An entry of the page strip under the table.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum PageItem {
    /// 1-based
    Page(usize),
    Ellipsis,
}

const MAX_VISIBLE_PAGES: usize = 5;

/// The page numbers to show, with ellipses when there are too many pages.
///
/// `current` is 1-based.
pub fn page_numbers(total: usize, current: usize) -> Vec<PageItem> {
    let mut pages: Vec<PageItem> = Vec::new();
    if total <= MAX_VISIBLE_PAGES {
        pages.extend((1..=total).map(PageItem::Page));
    } else if current <= 3 {
        pages.extend((1..=4).map(PageItem::Page));
        pages.push(PageItem::Ellipsis);
        pages.push(PageItem::Page(total));
    } else if current >= total - 2 {
        pages.push(PageItem::Page(1));
        pages.push(PageItem::Ellipsis);
        pages.extend((total - 3..=total).map(PageItem::Page));
    } else {
        pages.push(PageItem::Page(1));
        pages.push(PageItem::Ellipsis);
        pages.extend((current - 1..=current + 1).map(PageItem::Page));
        pages.push(PageItem::Ellipsis);
        pages.push(PageItem::Page(total));
    }
    pages
}

fn compare_values(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub struct TableView<'a, T> {
    kind: CollectionKind,
    columns: Vec<Column<T>>,
    data: &'a [T],
    /// Index of the sorted column, and whether the order is descending.
    sorting: Option<(usize, bool)>,
    global_filter: String,
    page_size: usize,
    page_index: usize,
}

impl<'a, T> TableView<'a, T> {
    pub fn new(kind: CollectionKind, columns: Vec<Column<T>>, data: &'a [T]) -> TableView<'a, T> {
        let sort_col = columns.iter().position(|c| c.id == "clinic").unwrap_or(0);
        let sorting = if columns.is_empty() {
            None
        } else {
            Some((sort_col, false))
        };
        TableView {
            kind,
            columns,
            data,
            sorting,
            global_filter: "".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            page_index: 0,
        }
    }

    pub fn set_sorting(&mut self, column_id: &str, desc: bool) -> DashboardResult<()> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.id == column_id)
            .context(UnknownColumnSnafu { id: column_id })?;
        self.sorting = Some((idx, desc));
        Ok(())
    }

    pub fn toggle_descending(&mut self) {
        if let Some((_, desc)) = self.sorting.as_mut() {
            *desc = !*desc;
        }
    }

    /// Searches all the columns, without case. Goes back to the first page.
    pub fn set_global_filter(&mut self, filter: &str) {
        self.global_filter = filter.to_string();
        self.page_index = 0;
    }

    /// Keeps the first row of the current page visible.
    pub fn set_page_size(&mut self, page_size: usize) {
        let page_size = page_size.max(1);
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            debug!("set_page_size: non standard page size {}", page_size);
        }
        let top_row = self.current_page_index() * self.page_size;
        self.page_size = page_size;
        self.page_index = top_row / page_size;
    }

    /// 0-based. Out of range values go to the last page.
    pub fn set_page_index(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    fn matches_filter(&self, row: &T) -> bool {
        let needle = self.global_filter.trim().to_lowercase();
        needle.is_empty()
            || self
                .columns
                .iter()
                .any(|c| (c.accessor)(row).to_lowercase().contains(&needle))
    }

    /// The rows that pass the search, in the sorted order.
    pub fn filtered_rows(&self) -> Vec<&'a T> {
        let mut rows: Vec<&'a T> = self
            .data
            .iter()
            .filter(|r| self.matches_filter(r))
            .collect();
        if let Some((col_idx, desc)) = self.sorting {
            let accessor = self.columns[col_idx].accessor;
            rows.sort_by(|a, b| {
                let o = compare_values(accessor(a), accessor(b));
                if desc {
                    o.reverse()
                } else {
                    o
                }
            });
        }
        rows
    }

    pub fn page_count(&self) -> usize {
        self.filtered_rows().len().div_ceil(self.page_size)
    }

    fn current_page_index(&self) -> usize {
        self.page_index.min(self.page_count().saturating_sub(1))
    }

    pub fn page_rows(&self) -> Vec<&'a T> {
        let start = self.current_page_index() * self.page_size;
        self.filtered_rows()
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect()
    }

    pub fn page_numbers(&self) -> Vec<PageItem> {
        page_numbers(self.page_count(), self.current_page_index() + 1)
    }

    /// The filtered rows as CSV: every field quoted, one line per row.
    pub fn export_csv(&self) -> DashboardResult<String> {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut wtr = WriterBuilder::new()
                .quote_style(QuoteStyle::Always)
                .terminator(Terminator::Any(b'\n'))
                .from_writer(&mut buf);
            wtr.write_record(self.columns.iter().map(|c| c.header))
                .context(CsvWriteSnafu {})?;
            for row in self.filtered_rows() {
                wtr.write_record(self.columns.iter().map(|c| (c.accessor)(row)))
                    .context(CsvWriteSnafu {})?;
            }
            wtr.flush()
                .map_err(csv::Error::from)
                .context(CsvWriteSnafu {})?;
        }
        let mut res = String::from_utf8_lossy(&buf).into_owned();
        // No line break after the last row.
        if res.ends_with('\n') {
            res.pop();
        }
        Ok(res)
    }

    /// The current page as text, followed by the page strip.
    pub fn render_page(&self) -> String {
        let rows = self.page_rows();
        let cells: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| self.columns.iter().map(|c| (c.accessor)(r)).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, c)| {
                cells
                    .iter()
                    .map(|r| r[idx].chars().count())
                    .chain(std::iter::once(c.header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let line = |values: Vec<&str>| -> String {
            values
                .iter()
                .zip(widths.iter())
                .map(|(v, w)| format!("{:<width$}", v, width = *w))
                .collect::<Vec<String>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out: Vec<String> = vec![self.kind.title().to_string()];
        out.push(line(self.columns.iter().map(|c| c.header).collect()));
        out.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<String>>()
                .join("-+-"),
        );
        if cells.is_empty() {
            out.push("No results.".to_string());
        }
        for r in cells {
            out.push(line(r));
        }
        let current = self.current_page_index() + 1;
        let strip: Vec<String> = self
            .page_numbers()
            .iter()
            .map(|p| match p {
                PageItem::Page(n) if *n == current => format!("[{}]", n),
                PageItem::Page(n) => n.to_string(),
                PageItem::Ellipsis => "...".to_string(),
            })
            .collect();
        out.push(format!(
            "Page {} of {} ({} rows, {} per page)  {}",
            current.min(self.page_count()),
            self.page_count(),
            self.filtered_rows().len(),
            self.page_size,
            strip.join(" ")
        ));
        out.join("\n")
    }
}
