use chrono::Weekday;
use serde::Deserialize;
use serde::Serialize;

/// Weekday ordering table used to resolve day labels.
///
/// Index `i` of `names` holds every accepted spelling of the weekday that is
/// `i` days after `first`. Timetables from different sources disagree on
/// where the week starts, so neither ordering is assumed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeekdayTable {
    /// Weekday represented by index 0
    pub first: Weekday,
    /// Accepted spellings per index
    pub names: Vec<Vec<String>>,
}

impl WeekdayTable {
    pub fn new(first: Weekday, names: Vec<Vec<String>>) -> Self {
        Self { first, names }
    }

    /// Monday-first table with German long and short names plus English names.
    pub fn monday_first() -> Self {
        let names = [
            ["Montag", "Mo", "Monday"],
            ["Dienstag", "Di", "Tuesday"],
            ["Mittwoch", "Mi", "Wednesday"],
            ["Donnerstag", "Do", "Thursday"],
            ["Freitag", "Fr", "Friday"],
            ["Samstag", "Sa", "Saturday"],
            ["Sonntag", "So", "Sunday"],
        ];
        Self::new(Weekday::Mon, to_owned_names(&names))
    }

    /// Sunday-first table with the two-letter German abbreviations.
    pub fn sunday_first() -> Self {
        let names = [["So"], ["Mo"], ["Di"], ["Mi"], ["Do"], ["Fr"], ["Sa"]];
        Self::new(Weekday::Sun, to_owned_names(&names))
    }

    /// Number of configured weekday slots.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Finds the table index of a day label, ignoring case and surrounding whitespace.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.names.iter().position(|spellings| {
            spellings
                .iter()
                .any(|spelling| spelling.eq_ignore_ascii_case(name))
        })
    }

    /// Maps a table index to a weekday, `None` past the seventh slot.
    pub fn weekday(&self, index: usize) -> Option<Weekday> {
        if index >= 7 || index >= self.names.len() {
            return None;
        }
        let mut weekday = self.first;
        for _ in 0..index {
            weekday = weekday.succ();
        }
        Some(weekday)
    }

    /// Resolves a day label to a weekday.
    pub fn resolve(&self, name: &str) -> Option<Weekday> {
        self.index_of(name).and_then(|index| self.weekday(index))
    }
}

impl Default for WeekdayTable {
    fn default() -> Self {
        Self::monday_first()
    }
}

fn to_owned_names<const N: usize>(names: &[[&str; N]]) -> Vec<Vec<String>> {
    names
        .iter()
        .map(|spellings| spellings.iter().map(|name| (*name).to_owned()).collect())
        .collect()
}
