use diagrid_core::model::Archetype;

use crate::{
    LayoutError,
    layout::{
        archetypes::{ArchetypeContext, ArchetypeStrategy},
        placement::Placement,
    },
};

/// Process flows keep the layered drawing as placed.
#[derive(Debug, Default)]
pub struct Flow;

impl ArchetypeStrategy for Flow {
    fn name(&self) -> &'static str {
        "flow"
    }

    fn supports(&self, archetype: Archetype) -> bool {
        archetype == Archetype::Flow
    }

    fn apply(
        &self,
        placement: &Placement,
        _ctx: &ArchetypeContext<'_, '_>,
    ) -> Result<Placement, LayoutError> {
        Ok(placement.clone())
    }
}
