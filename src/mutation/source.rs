//! Rule application across source typologies.

use tracing::warn;

use crate::logic_tree::{Rule, RuleKind};
use crate::mutation::mfd::{apply_b_value_delta, apply_max_magnitude_delta};
use crate::mutation::MutationError;
use crate::types::mfd::{GutenbergRichterMfd, Mfd};
use crate::types::source::{
    AreaSource, FaultSource, MfdForFocalMechanism, PointSource, SeismicSource,
    SubductionFaultSource,
};

/// Apply `rule` to a single GR distribution.
fn apply_rule_to_gr(
    mfd: &GutenbergRichterMfd,
    rule: &Rule,
    source_name: &str,
) -> Result<GutenbergRichterMfd, MutationError> {
    match rule.kind {
        RuleKind::MaxMagnitudeGRRelative => apply_max_magnitude_delta(mfd, rule.value, source_name),
        RuleKind::BValueGRRelative => apply_b_value_delta(mfd, rule.value, source_name),
    }
}

/// Rebuild a focal-mechanism MFD collection, replacing every GR entry.
/// Non-GR entries are copied as they are.
fn apply_rule_to_mfd_list(
    mfds: &[MfdForFocalMechanism],
    rule: &Rule,
    source_name: &str,
) -> Result<Vec<MfdForFocalMechanism>, MutationError> {
    mfds.iter()
        .map(|entry| -> Result<MfdForFocalMechanism, MutationError> {
            let mfd = match &entry.mfd {
                Mfd::GutenbergRichter(gr) => Mfd::GutenbergRichter(apply_rule_to_gr(gr, rule, source_name)?),
                other => other.clone(),
            };
            Ok(MfdForFocalMechanism {
                mfd,
                focal_mechanism: entry.focal_mechanism,
            })
        })
        .collect()
}

fn apply_rule_to_area_source(src: &AreaSource, rule: &Rule) -> Result<AreaSource, MutationError> {
    Ok(AreaSource {
        mfds: apply_rule_to_mfd_list(&src.mfds, rule, &src.name)?,
        ..src.clone()
    })
}

fn apply_rule_to_point_source(src: &PointSource, rule: &Rule) -> Result<PointSource, MutationError> {
    Ok(PointSource {
        mfds: apply_rule_to_mfd_list(&src.mfds, rule, &src.name)?,
        ..src.clone()
    })
}

fn apply_rule_to_fault_source(src: &FaultSource, rule: &Rule) -> Result<FaultSource, MutationError> {
    match &src.mfd {
        Mfd::GutenbergRichter(gr) => Ok(FaultSource {
            id: src.id.clone(),
            name: src.name.clone(),
            tectonic_region: src.tectonic_region,
            mfd: Mfd::GutenbergRichter(apply_rule_to_gr(gr, rule, &src.name)?),
            trace: src.trace.clone(),
            dip: src.dip,
            rake: src.rake,
            seismogenic_depth_lower: src.seismogenic_depth_lower,
            seismogenic_depth_upper: src.seismogenic_depth_upper,
            floating_rupture: src.floating_rupture,
        }),
        Mfd::Incremental(_) => {
            warn!(source = %src.name, rule = %rule.kind, "fault source MFD is not GR, rule not applied");
            Ok(src.clone())
        }
    }
}

fn apply_rule_to_subduction_source(
    src: &SubductionFaultSource,
    rule: &Rule,
) -> Result<SubductionFaultSource, MutationError> {
    match &src.mfd {
        Mfd::GutenbergRichter(gr) => Ok(SubductionFaultSource {
            id: src.id.clone(),
            name: src.name.clone(),
            tectonic_region: src.tectonic_region,
            top_trace: src.top_trace.clone(),
            bottom_trace: src.bottom_trace.clone(),
            rake: src.rake,
            mfd: Mfd::GutenbergRichter(apply_rule_to_gr(gr, rule, &src.name)?),
            floating_rupture: src.floating_rupture,
        }),
        Mfd::Incremental(_) => {
            warn!(source = %src.name, rule = %rule.kind, "subduction source MFD is not GR, rule not applied");
            Ok(src.clone())
        }
    }
}

/// Apply a rule to a source and return the perturbed copy.
///
/// Area and point sources have every GR distribution in their collection
/// replaced. Fault and subduction sources are rebuilt with the new GR
/// distribution; when their MFD is not GR the source comes back unchanged.
/// The input source is never modified.
pub fn apply_rule(source: &SeismicSource, rule: &Rule) -> Result<SeismicSource, MutationError> {
    Ok(match source {
        SeismicSource::Area(src) => SeismicSource::Area(apply_rule_to_area_source(src, rule)?),
        SeismicSource::Point(src) => SeismicSource::Point(apply_rule_to_point_source(src, rule)?),
        SeismicSource::Fault(src) => SeismicSource::Fault(apply_rule_to_fault_source(src, rule)?),
        SeismicSource::SubductionFault(src) => {
            SeismicSource::SubductionFault(apply_rule_to_subduction_source(src, rule)?)
        }
    })
}

/// Apply one rule to every source of a list, producing a new list.
pub fn apply_rule_to_source_list(
    sources: &[SeismicSource],
    rule: &Rule,
) -> Result<Vec<SeismicSource>, MutationError> {
    sources.iter().map(|src| apply_rule(src, rule)).collect()
}
