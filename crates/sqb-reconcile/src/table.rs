use sqb_schemas::{Personalization, SquareId, UnderlayPersonalization, NUM_SQUARES};
use std::fmt;

/// Fixed-size arena of per-square state, indexed by square id.
///
/// Three dense arrays of exactly [`NUM_SQUARES`] slots, matching the
/// on-disk layout where square id *n* occupies index *n−1*. A dynamic map
/// would lose both the O(1) access and the stable array shape the storage
/// boundary depends on, so the arena never grows or shrinks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquareTable {
    personalizations: Vec<Option<Personalization>>,
    underlays: Vec<Option<UnderlayPersonalization>>,
    underlay_visible: Vec<bool>,
}

impl SquareTable {
    /// Genesis state: nothing personalized, no underlays, nothing visible.
    ///
    /// Visibility starts false for every square: an underlay recorded
    /// before the square's first main-contract event is stored but must
    /// not surface until a qualifying blank main state appears.
    pub fn new() -> Self {
        Self {
            personalizations: vec![None; NUM_SQUARES],
            underlays: vec![None; NUM_SQUARES],
            underlay_visible: vec![false; NUM_SQUARES],
        }
    }

    /// Rebuild from the storage boundary's dense arrays.
    pub fn from_parts(
        personalizations: Vec<Option<Personalization>>,
        underlays: Vec<Option<UnderlayPersonalization>>,
        underlay_visible: Vec<bool>,
    ) -> Result<Self, TableShapeError> {
        for (name, len) in [
            ("personalizations", personalizations.len()),
            ("underlays", underlays.len()),
            ("visibility", underlay_visible.len()),
        ] {
            if len != NUM_SQUARES {
                return Err(TableShapeError { array: name, len });
            }
        }
        Ok(Self {
            personalizations,
            underlays,
            underlay_visible,
        })
    }

    pub fn personalization(&self, id: SquareId) -> Option<&Personalization> {
        self.personalizations[id.index()].as_ref()
    }

    pub fn set_personalization(&mut self, id: SquareId, record: Personalization) {
        self.personalizations[id.index()] = Some(record);
    }

    pub fn underlay(&self, id: SquareId) -> Option<&UnderlayPersonalization> {
        self.underlays[id.index()].as_ref()
    }

    pub fn set_underlay(&mut self, id: SquareId, record: UnderlayPersonalization) {
        self.underlays[id.index()] = Some(record);
    }

    pub fn underlay_visible(&self, id: SquareId) -> bool {
        self.underlay_visible[id.index()]
    }

    pub fn set_underlay_visible(&mut self, id: SquareId, visible: bool) {
        self.underlay_visible[id.index()] = visible;
    }

    pub fn personalized_count(&self) -> usize {
        self.personalizations.iter().filter(|p| p.is_some()).count()
    }

    pub fn underlay_count(&self) -> usize {
        self.underlays.iter().filter(|u| u.is_some()).count()
    }

    pub fn visible_count(&self) -> usize {
        self.underlay_visible.iter().filter(|v| **v).count()
    }

    /// The dense arrays, in storage order, for the checkpoint writer.
    pub fn parts(
        &self,
    ) -> (
        &[Option<Personalization>],
        &[Option<UnderlayPersonalization>],
        &[bool],
    ) {
        (
            &self.personalizations,
            &self.underlays,
            &self.underlay_visible,
        )
    }
}

impl Default for SquareTable {
    fn default() -> Self {
        Self::new()
    }
}

/// A storage array with the wrong element count was offered to
/// [`SquareTable::from_parts`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableShapeError {
    pub array: &'static str,
    pub len: usize,
}

impl fmt::Display for TableShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} array has {} entries, expected {}",
            self.array, self.len, NUM_SQUARES
        )
    }
}

impl std::error::Error for TableShapeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use sqb_schemas::PixelData;

    fn sq(n: u64) -> SquareId {
        SquareId::new(n).unwrap()
    }

    #[test]
    fn new_table_is_empty_and_invisible() {
        let table = SquareTable::new();
        assert_eq!(table.personalized_count(), 0);
        assert_eq!(table.underlay_count(), 0);
        assert_eq!(table.visible_count(), 0);
        assert!(table.personalization(sq(1)).is_none());
        assert!(!table.underlay_visible(sq(10_000)));
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut table = SquareTable::new();
        let id = sq(42);
        table.set_personalization(
            id,
            Personalization {
                version: 2,
                title: "t".into(),
                href: "h".into(),
                updated_block: 7,
            },
        );
        table.set_underlay(
            id,
            UnderlayPersonalization {
                title: "u".into(),
                href: "uh".into(),
                pixel_data: PixelData::UNPERSONALIZED,
            },
        );
        table.set_underlay_visible(id, true);

        assert_eq!(table.personalization(id).unwrap().version, 2);
        assert_eq!(table.underlay(id).unwrap().title, "u");
        assert!(table.underlay_visible(id));
        assert_eq!(table.personalized_count(), 1);
        assert_eq!(table.visible_count(), 1);
    }

    #[test]
    fn from_parts_rejects_wrong_lengths() {
        let err = SquareTable::from_parts(vec![None; 9_999], vec![None; NUM_SQUARES], vec![false; NUM_SQUARES])
            .unwrap_err();
        assert_eq!(err.array, "personalizations");
        assert_eq!(err.len, 9_999);
    }
}
