use crate::calendar::{
    CalendarDate, days_in_month, first_weekday_of_month, next_month, previous_month,
};

/// Fixed 6-week layout: the grid always holds 42 cells so month views never
/// change height between months.
pub const GRID_CELLS: usize = 42;
pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub date: CalendarDate,
    pub is_current_month: bool,
    pub is_today: bool,
}

/// Builds the 42-cell grid for the given month: leading days from the
/// previous month, the month itself, trailing days from the next month.
///
/// `today` is passed in by the caller; nothing here reads the system clock,
/// so the result is a pure function of its arguments.
pub fn build_grid(year: i32, month: u32, today: CalendarDate) -> anyhow::Result<Vec<GridCell>> {
    let leading = first_weekday_of_month(year, month)? as usize;
    let current_days = days_in_month(year, month)?;

    let mut cells = Vec::with_capacity(GRID_CELLS);

    let (prev_year, prev_month) = previous_month(year, month)?;
    let prev_days = days_in_month(prev_year, prev_month)?;
    for offset in 0..leading {
        let day = prev_days - leading as u32 + offset as u32 + 1;
        cells.push(cell(prev_year, prev_month, day, false, today)?);
    }

    for day in 1..=current_days {
        cells.push(cell(year, month, day, true, today)?);
    }

    let (next_year, next_month) = next_month(year, month)?;
    let trailing = GRID_CELLS - cells.len();
    for day in 1..=trailing as u32 {
        cells.push(cell(next_year, next_month, day, false, today)?);
    }

    debug_assert_eq!(cells.len(), GRID_CELLS);
    Ok(cells)
}

fn cell(
    year: i32,
    month: u32,
    day: u32,
    is_current_month: bool,
    today: CalendarDate,
) -> anyhow::Result<GridCell> {
    let date = CalendarDate::new(year, month, day)?;
    Ok(GridCell {
        date,
        is_current_month,
        is_today: date == today,
    })
}
