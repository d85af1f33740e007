//! # Course Aggregation
//!
//! Folds events found across many documents into per-course collections.
//! Courses are keyed by their normalized title and keep their first-seen
//! order, so the output is deterministic for a given document order.
use crate::classify::Category;
use crate::expand::Event;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt::Display;

/// Participant tuple of a course: who attends it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Member {
    pub degree: String,
    pub semester: u32,
    pub group: u32,
}

impl Member {
    pub fn new(degree: &str, semester: u32, group: u32) -> Self {
        Self {
            degree: degree.to_owned(),
            semester,
            group,
        }
    }
}

impl Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}. Sem. group {}", self.degree, self.semester, self.group)
    }
}

/// Which event fields decide that two events are duplicates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupKey {
    /// Same start, end and rooms
    #[default]
    Strict,
    /// Same start only
    Start,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum EventKey {
    Start(NaiveDateTime),
    Strict(NaiveDateTime, NaiveDateTime, Vec<String>),
}

impl DedupKey {
    pub(crate) fn key(&self, event: &Event) -> EventKey {
        match self {
            DedupKey::Start => EventKey::Start(event.start),
            DedupKey::Strict => EventKey::Strict(event.start, event.end, event.rooms.clone()),
        }
    }
}

/// All events sharing one normalized title, and the members attending them.
#[derive(Clone, Debug, Serialize)]
pub struct Course {
    pub title: String,
    pub category: Category,
    events: Vec<Event>,
    members: Vec<Member>,
    #[serde(skip)]
    event_keys: HashSet<EventKey>,
    #[serde(skip)]
    member_keys: HashSet<Member>,
}

impl Course {
    pub fn new(title: &str, category: Category) -> Self {
        Self {
            title: title.to_owned(),
            category,
            events: Vec::new(),
            members: Vec::new(),
            event_keys: HashSet::new(),
            member_keys: HashSet::new(),
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn has_member(&self, member: &Member) -> bool {
        self.member_keys.contains(member)
    }

    /// Adds an event unless an equivalent one is present. Returns true if added.
    pub fn add_event(&mut self, event: Event, dedup: DedupKey) -> bool {
        if self.event_keys.insert(dedup.key(&event)) {
            self.events.push(event);
            true
        } else {
            false
        }
    }

    /// Adds a member unless present. Returns true if added.
    pub fn add_member(&mut self, member: &Member) -> bool {
        if self.member_keys.insert(member.clone()) {
            self.members.push(member.clone());
            true
        } else {
            false
        }
    }
}

/// Counts of what one ingestion actually changed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Ingested {
    pub events: usize,
    pub member: bool,
}

/// Keyed course collection spanning a whole multi-document run.
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    dedup: DedupKey,
    courses: Vec<Course>,
    index: HashMap<String, usize>,
}

impl Aggregator {
    pub fn new(dedup: DedupKey) -> Self {
        Self {
            dedup,
            courses: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn dedup(&self) -> DedupKey {
        self.dedup
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Merges events and a member into the course named `title`, creating it
    /// on first sight. Ingesting the same data again changes nothing.
    pub fn ingest<I>(&mut self, title: &str, category: Category, events: I, member: &Member) -> Ingested
    where
        I: IntoIterator<Item = Event>,
    {
        let dedup = self.dedup;
        let course = self.course_mut(title, category);
        let mut ingested = Ingested::default();
        for event in events {
            if course.add_event(event, dedup) {
                ingested.events += 1;
            }
        }
        ingested.member = course.add_member(member);
        ingested
    }

    fn course_mut(&mut self, title: &str, category: Category) -> &mut Course {
        let key = normalize_title(title);
        let index = match self.index.get(&key).copied() {
            Some(index) => index,
            None => {
                self.courses.push(Course::new(&key, category));
                self.index.insert(key, self.courses.len() - 1);
                self.courses.len() - 1
            }
        };
        &mut self.courses[index]
    }

    pub fn course(&self, title: &str) -> Option<&Course> {
        self.index
            .get(&normalize_title(title))
            .map(|index| &self.courses[*index])
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Every distinct member across all courses, in first-seen order.
    pub fn members(&self) -> Vec<&Member> {
        let mut seen = HashSet::<&Member>::new();
        self.courses
            .iter()
            .flat_map(|course| course.members.iter())
            .filter(|member| seen.insert(*member))
            .collect()
    }

    /// Every event of every course `member` attends, ordered by start time.
    pub fn events_for(&self, member: &Member) -> Vec<&Event> {
        let mut events = self
            .courses
            .iter()
            .filter(|course| course.has_member(member))
            .flat_map(|course| course.events.iter())
            .collect::<Vec<_>>();
        events.sort_by_key(|event| event.start);
        events
    }

    /// Folds an independently built aggregator into this one using this
    /// aggregator's dedup key.
    pub fn merge(&mut self, other: Aggregator) {
        for course in other.courses {
            let dedup = self.dedup;
            let target = self.course_mut(&course.title, course.category);
            for event in course.events {
                target.add_event(event, dedup);
            }
            for member in &course.members {
                target.add_member(member);
            }
        }
    }

    /// Consumes the aggregator, returning courses in first-seen order.
    pub fn finish(self) -> Vec<Course> {
        self.courses
    }
}

/// Course identity: the title with whitespace runs collapsed to single spaces.
pub fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(title: &str, day: u32, hour: u32, rooms: &[&str]) -> Event {
        let start = NaiveDate::from_ymd_opt(2023, 3, day).unwrap().and_hms_opt(hour, 0, 0).unwrap();
        Event {
            title: title.to_owned(),
            category: Category::Lecture,
            start,
            end: start + chrono::Duration::minutes(90),
            rooms: rooms.iter().map(|room| (*room).to_owned()).collect(),
            description: String::new(),
            source: "test".to_owned(),
        }
    }

    #[test]
    fn test_ingest_is_idempotent() {
        let mut aggregator = Aggregator::new(DedupKey::Strict);
        let member = Member::new("Informatik", 3, 1);
        let events = vec![event("Mathe", 6, 8, &["C12-0.01"]), event("Mathe", 13, 8, &["C12-0.01"])];

        let first = aggregator.ingest("Mathe", Category::Lecture, events.clone(), &member);
        assert_eq!(first, Ingested { events: 2, member: true });

        let second = aggregator.ingest("Mathe", Category::Lecture, events, &member);
        assert_eq!(second, Ingested { events: 0, member: false });

        let course = aggregator.course("Mathe").unwrap();
        assert_eq!(course.events().len(), 2);
        assert_eq!(course.members().len(), 1);
        assert_eq!(aggregator.len(), 1);
    }

    #[test]
    fn test_titles_are_normalized() {
        let mut aggregator = Aggregator::default();
        let member = Member::new("Mechatronik", 2, 0);
        aggregator.ingest("Technische\nMechanik ", Category::Lecture, vec![], &member);
        aggregator.ingest("  Technische   Mechanik", Category::Lecture, vec![], &member);
        assert_eq!(aggregator.len(), 1);
        assert_eq!(aggregator.courses()[0].title, "Technische Mechanik");
    }

    #[test]
    fn test_dedup_keys() {
        let strict_member = Member::new("Informatik", 1, 0);
        let events = vec![event("Mathe", 6, 8, &["C12-0.01"]), event("Mathe", 6, 8, &["C12-0.02"])];

        let mut strict = Aggregator::new(DedupKey::Strict);
        strict.ingest("Mathe", Category::Lecture, events.clone(), &strict_member);
        assert_eq!(strict.course("Mathe").unwrap().events().len(), 2);

        let mut loose = Aggregator::new(DedupKey::Start);
        loose.ingest("Mathe", Category::Lecture, events, &strict_member);
        assert_eq!(loose.course("Mathe").unwrap().events().len(), 1);
    }

    #[test]
    fn test_members_and_member_events() {
        let mut aggregator = Aggregator::default();
        let first = Member::new("Informatik", 3, 1);
        let second = Member::new("Informatik", 3, 2);
        aggregator.ingest("Mathe", Category::Lecture, vec![event("Mathe", 13, 8, &[])], &first);
        aggregator.ingest("Mathe", Category::Lecture, vec![event("Mathe", 13, 8, &[])], &second);
        aggregator.ingest("Physik", Category::Lab, vec![event("Physik", 6, 10, &[])], &first);

        assert_eq!(aggregator.members(), vec![&first, &second]);
        assert_eq!(aggregator.course("Mathe").unwrap().members(), &[first.clone(), second.clone()]);

        let titles = aggregator
            .events_for(&first)
            .iter()
            .map(|event| event.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["Physik", "Mathe"]);
        assert_eq!(aggregator.events_for(&second).len(), 1);
    }

    #[test]
    fn test_merge_partitions() {
        let member = Member::new("Informatik", 3, 1);
        let mut left = Aggregator::default();
        left.ingest("Mathe", Category::Lecture, vec![event("Mathe", 6, 8, &[])], &member);
        let mut right = Aggregator::default();
        right.ingest("Mathe", Category::Lecture, vec![event("Mathe", 6, 8, &[]), event("Mathe", 13, 8, &[])], &member);
        right.ingest("Physik", Category::Lecture, vec![event("Physik", 7, 8, &[])], &member);

        left.merge(right);
        assert_eq!(left.len(), 2);
        assert_eq!(left.course("Mathe").unwrap().events().len(), 2);
        assert_eq!(left.course("Mathe").unwrap().members().len(), 1);
    }

    #[test]
    fn test_course_serializes() {
        let mut aggregator = Aggregator::default();
        aggregator.ingest("Mathe", Category::Exercise, vec![event("Mathe", 6, 8, &["C12-0.01"])], &Member::new("Informatik", 3, 1));
        let json = serde_json::to_value(&aggregator.finish()[0]).unwrap();
        assert_eq!(json["title"], "Mathe");
        assert_eq!(json["category"], "exercise");
        assert_eq!(json["members"][0]["degree"], "Informatik");
        assert_eq!(json["events"][0]["rooms"][0], "C12-0.01");
        assert!(json.get("event_keys").is_none());
    }
}
