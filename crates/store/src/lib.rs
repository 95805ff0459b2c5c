use anyhow::{bail, Context};
use async_trait::async_trait;
use parking_lot::RwLock;
use sched_core::{AssignmentSink, SnapshotSource};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use types::{
    Assignment, CampusId, CampusSnapshot, ClassId, ClassSession, CourseId, Dataset, RoomId,
    RoomSpec, StudentId, SubjectId,
};

#[derive(Clone, Default)]
pub struct InMemStore {
    inner: Arc<RwLock<Dataset>>,
}

impl InMemStore {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            inner: Arc::new(RwLock::new(dataset)),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading dataset {}", path.display()))?;
        let dataset: Dataset = serde_json::from_str(&raw)
            .with_context(|| format!("parsing dataset {}", path.display()))?;
        info!(
            path = %path.display(),
            campuses = dataset.campuses.len(),
            classes = dataset.classes.len(),
            "dataset loaded"
        );
        Ok(Self::new(dataset))
    }

    pub fn campus_count(&self) -> usize {
        self.inner.read().campuses.len()
    }

    /// Persisted `(class, start, room)` triples of one campus, by class id.
    /// Classes that have never been scheduled are left out.
    pub fn timetable(&self, campus: &CampusId) -> anyhow::Result<Vec<Assignment>> {
        let data = self.inner.read();
        if !data.campuses.iter().any(|c| &c.id == campus) {
            bail!("unknown campus {campus}");
        }
        let owner = ClassOwner::new(&data);
        let mut out: Vec<Assignment> = data
            .classes
            .iter()
            .filter(|c| owner.campus_of(&c.subject_id) == Some(campus))
            .filter_map(|c| {
                Some(Assignment {
                    class_id: c.id.clone(),
                    start_slot: c.start_slot?,
                    room_id: c.room_id.clone()?,
                })
            })
            .collect();
        out.sort_by(|a, b| a.class_id.cmp(&b.class_id));
        Ok(out)
    }
}

/// subject → course → campus lookup over borrowed rows.
struct ClassOwner<'a> {
    course_of: HashMap<&'a SubjectId, &'a CourseId>,
    campus_of: HashMap<&'a CourseId, &'a CampusId>,
}

impl<'a> ClassOwner<'a> {
    fn new(data: &'a Dataset) -> Self {
        Self {
            course_of: data.subjects.iter().map(|s| (&s.id, &s.course_id)).collect(),
            campus_of: data.courses.iter().map(|c| (&c.id, &c.campus_id)).collect(),
        }
    }

    fn campus_of(&self, subject: &SubjectId) -> Option<&'a CampusId> {
        let course = self.course_of.get(subject)?;
        self.campus_of.get(*course).copied()
    }
}

fn snapshot_of(data: &Dataset, campus: &CampusId) -> anyhow::Result<CampusSnapshot> {
    if !data.campuses.iter().any(|c| &c.id == campus) {
        bail!("unknown campus {campus}");
    }
    let rooms = data
        .locations
        .iter()
        .filter(|l| &l.campus_id == campus)
        .map(|l| RoomSpec {
            id: l.id.clone(),
            session_types: l.session_types.iter().cloned().collect(),
        })
        .collect();

    let mut enrolled: HashMap<&SubjectId, BTreeSet<StudentId>> = HashMap::new();
    for e in &data.enrollments {
        enrolled
            .entry(&e.subject_id)
            .or_default()
            .insert(e.student_id.clone());
    }

    let owner = ClassOwner::new(data);
    let mut orphans = 0usize;
    let mut sessions: Vec<ClassSession> = Vec::new();
    for class in &data.classes {
        match owner.campus_of(&class.subject_id) {
            Some(c) if c == campus => sessions.push(ClassSession {
                id: class.id.clone(),
                session_type: class.session_type.clone(),
                duration: class.duration_slots,
                teacher: class.staff_id.clone(),
                students: enrolled.get(&class.subject_id).cloned().unwrap_or_default(),
            }),
            Some(_) => {}
            None => orphans += 1,
        }
    }
    if orphans > 0 {
        warn!(orphans, "classes without a resolvable campus skipped");
    }
    sessions.sort_by(|a, b| b.duration.cmp(&a.duration));

    Ok(CampusSnapshot {
        campus: campus.clone(),
        rooms,
        sessions,
    })
}

#[async_trait]
impl SnapshotSource for InMemStore {
    async fn campuses(&self) -> anyhow::Result<Vec<CampusId>> {
        Ok(self.inner.read().campuses.iter().map(|c| c.id.clone()).collect())
    }

    async fn campus_of_course(&self, course: &CourseId) -> anyhow::Result<Option<CampusId>> {
        let data = self.inner.read();
        Ok(data
            .courses
            .iter()
            .find(|c| &c.id == course)
            .map(|c| c.campus_id.clone()))
    }

    async fn load_campus(&self, campus: &CampusId) -> anyhow::Result<CampusSnapshot> {
        snapshot_of(&self.inner.read(), campus)
    }
}

#[async_trait]
impl AssignmentSink for InMemStore {
    async fn write_campus(&self, campus: &CampusId, assignments: &[Assignment]) -> anyhow::Result<()> {
        let mut data = self.inner.write();

        // Resolve everything before touching a row.
        let plan = {
            let owner = ClassOwner::new(&data);
            let rooms: BTreeSet<&RoomId> = data
                .locations
                .iter()
                .filter(|l| &l.campus_id == campus)
                .map(|l| &l.id)
                .collect();
            let classes: HashMap<&ClassId, usize> = data
                .classes
                .iter()
                .enumerate()
                .filter(|(_, c)| owner.campus_of(&c.subject_id) == Some(campus))
                .map(|(i, c)| (&c.id, i))
                .collect();

            let mut plan = Vec::with_capacity(assignments.len());
            for a in assignments {
                let Some(&row) = classes.get(&a.class_id) else {
                    bail!("class {} is not on campus {campus}", a.class_id);
                };
                if !rooms.contains(&a.room_id) {
                    bail!("room {} is not on campus {campus}", a.room_id);
                }
                plan.push((row, a.start_slot, a.room_id.clone()));
            }
            plan
        };

        for (row, start, room) in plan {
            let class = &mut data.classes[row];
            class.start_slot = Some(start);
            class.room_id = Some(room);
        }
        debug!(%campus, written = assignments.len(), "assignments stored");
        Ok(())
    }
}
