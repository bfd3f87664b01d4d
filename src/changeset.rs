//! Éditions locales en attente de commit.
//!
//! Chaque shift porte un statut `new`/`modified`/`deleted`/`unchanged`
//! relatif au dernier état commité (la *base*). Au commit, un diff à trois
//! voies (base, local, stockage courant) produit les insertions, mises à
//! jour et suppressions ; une modification concurrente du même shift côté
//! stockage bloque le commit.

use crate::model::{Shift, ShiftId, ShiftStatus};
use crate::storage::Storage;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeConflictKind {
    /// Un shift de même id a été créé dans le stockage entre-temps.
    InsertedRemotely,
    ModifiedRemotely,
    DeletedRemotely,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeConflict {
    pub shift_id: ShiftId,
    pub kind: ChangeConflictKind,
}

#[derive(Error, Debug)]
pub enum ChangesetError {
    #[error("unknown shift: {0}")]
    UnknownShift(String),
    #[error("shift already staged: {0}")]
    DuplicateShift(String),
    #[error("shift is deleted: {0}")]
    Deleted(String),
    #[error("{} change(s) conflict with the store", .0.len())]
    Conflicts(Vec<ChangeConflict>),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Opérations à appliquer au stockage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangePlan {
    pub inserts: Vec<Shift>,
    pub updates: Vec<Shift>,
    pub deletes: Vec<ShiftId>,
    pub conflicts: Vec<ChangeConflict>,
}

impl ChangePlan {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Applique le plan ; tout shift résultant est `unchanged`.
    pub fn apply(&self, shifts: &mut Vec<Shift>) {
        shifts.retain(|s| !self.deletes.contains(&s.id));
        for update in &self.updates {
            if let Some(target) = shifts.iter_mut().find(|s| s.id == update.id) {
                *target = update.clone();
            }
        }
        shifts.extend(self.inserts.iter().cloned());
        for shift in shifts.iter_mut() {
            shift.status = ShiftStatus::Unchanged;
        }
    }
}

/// Ensemble de shifts édité localement, indexé par id.
#[derive(Debug, Clone, Default)]
pub struct Changeset {
    base: BTreeMap<ShiftId, Shift>,
    local: BTreeMap<ShiftId, Shift>,
}

impl Changeset {
    /// Part d'un état commité : tout est `unchanged`.
    pub fn new<I: IntoIterator<Item = Shift>>(committed: I) -> Self {
        let base: BTreeMap<ShiftId, Shift> = committed
            .into_iter()
            .filter(|s| !s.is_deleted())
            .map(|mut s| {
                s.status = ShiftStatus::Unchanged;
                (s.id.clone(), s)
            })
            .collect();
        Self {
            local: base.clone(),
            base,
        }
    }

    pub fn from_storage(storage: &dyn Storage) -> Result<Self, ChangesetError> {
        Ok(Self::new(storage.load()?.shifts))
    }

    pub fn get(&self, id: &ShiftId) -> Option<&Shift> {
        self.local.get(id)
    }

    pub fn status(&self, id: &ShiftId) -> Option<ShiftStatus> {
        self.local.get(id).map(|s| s.status)
    }

    /// Tous les shifts suivis, `deleted` compris, triés par date.
    pub fn shifts(&self) -> Vec<Shift> {
        let mut out: Vec<Shift> = self.local.values().cloned().collect();
        out.sort_by(|a, b| {
            (a.date, a.start, &a.employee_id).cmp(&(b.date, b.start, &b.employee_id))
        });
        out
    }

    pub fn is_dirty(&self) -> bool {
        self.local
            .values()
            .any(|s| s.status != ShiftStatus::Unchanged)
    }

    pub fn add(&mut self, mut shift: Shift) -> Result<ShiftId, ChangesetError> {
        if self.local.contains_key(&shift.id) {
            return Err(ChangesetError::DuplicateShift(shift.id.as_str().to_string()));
        }
        shift.status = ShiftStatus::New;
        let id = shift.id.clone();
        self.local.insert(id.clone(), shift);
        Ok(id)
    }

    /// Met en attente un lot de shifts générés ; tout ou rien.
    pub fn stage_generated(&mut self, shifts: Vec<Shift>) -> Result<usize, ChangesetError> {
        if let Some(dup) = shifts.iter().find(|s| self.local.contains_key(&s.id)) {
            return Err(ChangesetError::DuplicateShift(dup.id.as_str().to_string()));
        }
        let count = shifts.len();
        for shift in shifts {
            self.add(shift)?;
        }
        debug!(count, "generated shifts staged");
        Ok(count)
    }

    /// Modifie un shift ; un shift commité passe `modified` s'il diffère
    /// de la base, un shift `new` le reste.
    pub fn edit<F: FnOnce(&mut Shift)>(&mut self, id: &ShiftId, f: F) -> Result<(), ChangesetError> {
        let shift = self
            .local
            .get_mut(id)
            .ok_or_else(|| ChangesetError::UnknownShift(id.as_str().to_string()))?;
        if shift.is_deleted() {
            return Err(ChangesetError::Deleted(id.as_str().to_string()));
        }
        let status = shift.status;
        f(shift);
        shift.id = id.clone();
        shift.status = match status {
            ShiftStatus::New => ShiftStatus::New,
            _ => match self.base.get(id) {
                Some(base) if base.same_content(shift) => ShiftStatus::Unchanged,
                _ => ShiftStatus::Modified,
            },
        };
        Ok(())
    }

    /// Un shift `new` disparaît ; un shift commité est marqué `deleted`
    /// jusqu'au commit (annulable par `restore`).
    pub fn remove(&mut self, id: &ShiftId) -> Result<(), ChangesetError> {
        let shift = self
            .local
            .get_mut(id)
            .ok_or_else(|| ChangesetError::UnknownShift(id.as_str().to_string()))?;
        if shift.status == ShiftStatus::New {
            self.local.remove(id);
        } else {
            shift.status = ShiftStatus::Deleted;
        }
        Ok(())
    }

    pub fn restore(&mut self, id: &ShiftId) -> Result<(), ChangesetError> {
        let shift = self
            .local
            .get_mut(id)
            .ok_or_else(|| ChangesetError::UnknownShift(id.as_str().to_string()))?;
        if shift.is_deleted() {
            shift.status = match self.base.get(id) {
                Some(base) if base.same_content(shift) => ShiftStatus::Unchanged,
                _ => ShiftStatus::Modified,
            };
        }
        Ok(())
    }

    /// Diff à trois voies contre l'état actuel du stockage.
    pub fn reconcile(&self, remote: &[Shift]) -> ChangePlan {
        let remote: BTreeMap<&ShiftId, &Shift> = remote.iter().map(|s| (&s.id, s)).collect();
        let mut plan = ChangePlan::default();
        let mut conflict = |shift_id: &ShiftId, kind| {
            plan.conflicts.push(ChangeConflict {
                shift_id: shift_id.clone(),
                kind,
            })
        };
        let mut inserts = Vec::new();
        let mut updates = Vec::new();
        let mut deletes = Vec::new();

        for (id, shift) in &self.local {
            let base = self.base.get(id);
            let theirs = remote.get(id).copied();
            let base_matches = |r: &Shift| base.is_some_and(|b| b.same_content(r));
            match shift.status {
                ShiftStatus::Unchanged => {}
                ShiftStatus::New => match theirs {
                    None => inserts.push(committed(shift)),
                    Some(r) if r.same_content(shift) => {}
                    Some(_) => conflict(id, ChangeConflictKind::InsertedRemotely),
                },
                ShiftStatus::Modified => match theirs {
                    None => conflict(id, ChangeConflictKind::DeletedRemotely),
                    Some(r) if r.same_content(shift) => {}
                    Some(r) if base_matches(r) => updates.push(committed(shift)),
                    Some(_) => conflict(id, ChangeConflictKind::ModifiedRemotely),
                },
                ShiftStatus::Deleted => match theirs {
                    None => {}
                    Some(r) if base_matches(r) => deletes.push(id.clone()),
                    Some(_) => conflict(id, ChangeConflictKind::ModifiedRemotely),
                },
            }
        }

        plan.inserts = inserts;
        plan.updates = updates;
        plan.deletes = deletes;
        plan
    }

    /// Applique les changements au stockage puis repart de son état.
    pub fn commit(&mut self, storage: &dyn Storage) -> Result<ChangePlan, ChangesetError> {
        let mut roster = storage.load()?;
        let plan = self.reconcile(&roster.shifts);
        if !plan.conflicts.is_empty() {
            return Err(ChangesetError::Conflicts(plan.conflicts));
        }
        plan.apply(&mut roster.shifts);
        storage.save(&roster)?;
        info!(
            inserted = plan.inserts.len(),
            updated = plan.updates.len(),
            deleted = plan.deletes.len(),
            "changeset committed"
        );
        *self = Self::new(roster.shifts);
        Ok(plan)
    }
}

fn committed(shift: &Shift) -> Shift {
    let mut out = shift.clone();
    out.status = ShiftStatus::Unchanged;
    out
}
