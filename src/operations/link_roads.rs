use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::error::{Result, TopologyError};
use crate::parse::LinkTarget;
use crate::topology::{
    ContactPoint, ElementType, Junction, LaneLink, Road, RoadId, RoadLink, RoadStore, SectionLink,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Predecessor,
    Successor,
}

#[derive(Debug)]
struct SectionAssignment {
    road: RoadId,
    section: usize,
    slot: Slot,
    link: SectionLink,
}

#[derive(Debug)]
struct LaneAssignment {
    road: RoadId,
    section: usize,
    lane: i32,
    slot: Slot,
    link: LaneLink,
}

/// Resolves road, lane section and lane connectivity across a whole store.
///
/// Every link field is cleared first and then rebuilt from the declared
/// link elements, so running the pass again yields the same links.
pub struct LinkRoads {
    junctions: HashSet<String>,
}

impl LinkRoads {
    /// Creates a linking pass that knows about the given junctions.
    #[must_use]
    pub fn new(junctions: &[Junction]) -> Self {
        Self {
            junctions: junctions.iter().map(|j| j.id.clone()).collect(),
        }
    }

    /// Executes the pass.
    ///
    /// # Errors
    ///
    /// Returns an error if a road declares more than one link, predecessor
    /// or successor element, links to a road that does not exist, or links
    /// to a road without a contact point.
    pub fn execute(&self, store: &mut RoadStore) -> Result<()> {
        for road in store.roads_mut() {
            road.clear_links();
        }
        let ids = store.ids().to_vec();

        for &id in &ids {
            let (predecessor, successor) = self.resolve(store.road(id)?, store)?;
            let road = store.road_mut(id)?;
            road.predecessor = predecessor;
            road.successor = successor;
        }

        let mut sections = Vec::new();
        for &id in &ids {
            section_assignments(store, id, &mut sections)?;
        }
        for a in &sections {
            let section = store.road_mut(a.road)?.section_mut(a.section)?;
            match a.slot {
                Slot::Predecessor => section.predecessor = Some(a.link),
                Slot::Successor => section.successor = Some(a.link),
            }
        }

        let mut lanes = Vec::new();
        for &id in &ids {
            lane_assignments(store, id, &mut lanes)?;
        }
        for a in &lanes {
            let lane = store
                .road_mut(a.road)?
                .section_mut(a.section)?
                .lane_mut(a.lane)
                .ok_or_else(|| TopologyError::EntityNotFound(format!("lane {}", a.lane)))?;
            match a.slot {
                Slot::Predecessor => lane.predecessors.push(a.link),
                Slot::Successor => lane.successors.push(a.link),
            }
        }

        debug!(
            roads = ids.len(),
            section_links = sections.len(),
            lane_links = lanes.len(),
            "linked road network"
        );
        Ok(())
    }

    fn resolve(&self, road: &Road, store: &RoadStore) -> Result<(Option<RoadLink>, Option<RoadLink>)> {
        let link = match road.links() {
            [] => return Ok((None, None)),
            [link] => link,
            _ => {
                return Err(TopologyError::MultipleLinks {
                    road: road.id().to_string(),
                    kind: "link",
                }
                .into())
            }
        };
        let single = |targets: &[LinkTarget], kind: &'static str| -> Result<Option<RoadLink>> {
            match targets {
                [] => Ok(None),
                [target] => self.target(road, target, store).map(Some),
                _ => Err(TopologyError::MultipleLinks {
                    road: road.id().to_string(),
                    kind,
                }
                .into()),
            }
        };
        Ok((
            single(&link.predecessors, "predecessor")?,
            single(&link.successors, "successor")?,
        ))
    }

    fn target(&self, road: &Road, target: &LinkTarget, store: &RoadStore) -> Result<RoadLink> {
        match target.element_type {
            ElementType::Road => {
                let key = store.key_of(&target.element_id).ok_or_else(|| {
                    TopologyError::EntityNotFound(format!(
                        "road {} linked from road {}",
                        target.element_id,
                        road.id()
                    ))
                })?;
                let contact = target.contact_point.ok_or_else(|| {
                    TopologyError::InvalidTopology(format!(
                        "road {} links to road {} without a contact point",
                        road.id(),
                        target.element_id
                    ))
                })?;
                Ok(RoadLink::Road { road: key, contact })
            }
            ElementType::Junction => {
                if !self.junctions.contains(&target.element_id) {
                    warn!(road = road.id(), junction = %target.element_id, "link to unknown junction");
                }
                Ok(RoadLink::Junction {
                    id: target.element_id.clone(),
                })
            }
        }
    }
}

/// Index of the section of `road` that touches the given end.
fn end_section(road: &Road, contact: ContactPoint) -> Option<usize> {
    match contact {
        ContactPoint::Beginning => (!road.sections().is_empty()).then_some(0),
        ContactPoint::End => road.sections().len().checked_sub(1),
    }
}

/// Slot of the other road's section that a link attaching at `contact` writes to.
fn reciprocal_slot(contact: ContactPoint) -> Slot {
    match contact {
        ContactPoint::Beginning => Slot::Predecessor,
        ContactPoint::End => Slot::Successor,
    }
}

fn section_assignments(store: &RoadStore, id: RoadId, out: &mut Vec<SectionAssignment>) -> Result<()> {
    let road = store.road(id)?;
    let Some(last) = road.sections().len().checked_sub(1) else {
        return Ok(());
    };

    if let Some(&RoadLink::Road { road: other, contact }) = road.predecessor() {
        if let Some(other_section) = end_section(store.road(other)?, contact) {
            out.push(SectionAssignment {
                road: other,
                section: other_section,
                slot: reciprocal_slot(contact),
                link: SectionLink {
                    road: id,
                    section: 0,
                    contact: ContactPoint::Beginning,
                },
            });
            out.push(SectionAssignment {
                road: id,
                section: 0,
                slot: Slot::Predecessor,
                link: SectionLink {
                    road: other,
                    section: other_section,
                    contact,
                },
            });
        }
    }

    for i in 0..last {
        out.push(SectionAssignment {
            road: id,
            section: i,
            slot: Slot::Successor,
            link: SectionLink {
                road: id,
                section: i + 1,
                contact: ContactPoint::Beginning,
            },
        });
        out.push(SectionAssignment {
            road: id,
            section: i + 1,
            slot: Slot::Predecessor,
            link: SectionLink {
                road: id,
                section: i,
                contact: ContactPoint::End,
            },
        });
    }

    if let Some(&RoadLink::Road { road: other, contact }) = road.successor() {
        if let Some(other_section) = end_section(store.road(other)?, contact) {
            out.push(SectionAssignment {
                road: id,
                section: last,
                slot: Slot::Successor,
                link: SectionLink {
                    road: other,
                    section: other_section,
                    contact,
                },
            });
            out.push(SectionAssignment {
                road: other,
                section: other_section,
                slot: reciprocal_slot(contact),
                link: SectionLink {
                    road: id,
                    section: last,
                    contact: ContactPoint::End,
                },
            });
        }
    }
    Ok(())
}

fn lane_assignments(store: &RoadStore, id: RoadId, out: &mut Vec<LaneAssignment>) -> Result<()> {
    let road = store.road(id)?;
    for section in road.sections() {
        let neighbours = [
            (Slot::Predecessor, section.predecessor()),
            (Slot::Successor, section.successor()),
        ];
        for (slot, target) in neighbours {
            let Some(target) = target else { continue };
            let target_section = store.section(target)?;
            for lane in section.lanes() {
                let declared = match slot {
                    Slot::Predecessor => lane.predecessor_ids(),
                    Slot::Successor => lane.successor_ids(),
                };
                for &lane_id in declared {
                    if target_section.lane(lane_id).is_none() {
                        trace!(%lane, target = lane_id, "linked lane not present, skipping");
                        continue;
                    }
                    out.push(LaneAssignment {
                        road: id,
                        section: section.index(),
                        lane: lane.id(),
                        slot,
                        link: LaneLink {
                            road: target.road,
                            section: target.section,
                            lane: lane_id,
                            contact: target.contact,
                        },
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::OdrError;
    use crate::network::LoadOptions;
    use crate::parse::parse_document;

    fn lane_xml(id: i32, predecessor: Option<i32>, successor: Option<i32>) -> String {
        let mut link = String::new();
        if let Some(p) = predecessor {
            link.push_str(&format!(r#"<predecessor id="{p}"/>"#));
        }
        if let Some(s) = successor {
            link.push_str(&format!(r#"<successor id="{s}"/>"#));
        }
        format!(
            r#"<lane id="{id}" type="driving"><link>{link}</link><width sOffset="0" a="3" b="0" c="0" d="0"/></lane>"#
        )
    }

    fn section_xml(s: f64, left: &str, right: &str) -> String {
        format!(
            r#"<laneSection s="{s}"><left>{left}</left><center><lane id="0" type="none"/></center><right>{right}</right></laneSection>"#
        )
    }

    fn road_xml(id: &str, x: f64, link: &str, sections: &str) -> String {
        format!(
            r#"<road id="{id}" length="10" junction="-1">
                <link>{link}</link>
                <planView><geometry s="0" x="{x}" y="0" hdg="0" length="10"><line/></geometry></planView>
                <lanes>{sections}</lanes>
            </road>"#
        )
    }

    fn store(roads: &[String]) -> Result<RoadStore> {
        let doc = parse_document(&format!("<OpenDRIVE>{}</OpenDRIVE>", roads.concat()))?;
        let mut store = RoadStore::new();
        for record in doc.roads {
            store.add_road(Road::build(record, &LoadOptions::default())?)?;
        }
        Ok(store)
    }

    /// Road A (two sections) followed by road B, joined end to start.
    fn chained(b_contact: &str) -> RoadStore {
        let a = road_xml(
            "A",
            0.0,
            &format!(r#"<successor elementType="road" elementId="B" contactPoint="{b_contact}"/>"#),
            &(section_xml(0.0, &lane_xml(1, Some(1), None), &lane_xml(-1, None, Some(-1)))
                + &section_xml(5.0, &lane_xml(1, Some(1), None), &lane_xml(-1, None, Some(-1)))),
        );
        let b = road_xml(
            "B",
            10.0,
            r#"<predecessor elementType="road" elementId="A" contactPoint="end"/>"#,
            &section_xml(0.0, &lane_xml(1, None, Some(1)), &lane_xml(-1, Some(-1), None)),
        );
        store(&[a, b]).unwrap()
    }

    #[test]
    fn sections_are_linked_reciprocally() {
        let mut store = chained("start");
        LinkRoads::new(&[]).execute(&mut store).unwrap();
        let a = store.key_of("A").unwrap();
        let b = store.key_of("B").unwrap();
        let road_a = store.road(a).unwrap();
        let road_b = store.road(b).unwrap();

        assert_eq!(
            road_a.successor(),
            Some(&RoadLink::Road { road: b, contact: ContactPoint::Beginning })
        );
        assert_eq!(
            road_a.sections()[1].successor(),
            Some(&SectionLink { road: b, section: 0, contact: ContactPoint::Beginning })
        );
        assert_eq!(
            road_b.sections()[0].predecessor(),
            Some(&SectionLink { road: a, section: 1, contact: ContactPoint::End })
        );
        assert_eq!(
            road_a.sections()[0].successor(),
            Some(&SectionLink { road: a, section: 1, contact: ContactPoint::Beginning })
        );
        assert_eq!(
            road_a.sections()[1].predecessor(),
            Some(&SectionLink { road: a, section: 0, contact: ContactPoint::End })
        );
    }

    #[test]
    fn lanes_follow_section_links() {
        let mut store = chained("start");
        LinkRoads::new(&[]).execute(&mut store).unwrap();
        let a = store.key_of("A").unwrap();
        let b = store.key_of("B").unwrap();

        let lane = store.lane_at(a, 1, -1).unwrap();
        assert_eq!(
            lane.successors(),
            &[LaneLink { road: b, section: 0, lane: -1, contact: ContactPoint::Beginning }]
        );
        let interior = store.lane_at(a, 0, -1).unwrap();
        assert_eq!(interior.successors()[0].section, 1);
        let dead_end = store.lane_at(b, 0, 1).unwrap();
        assert!(dead_end.successors().is_empty());
        let right_b = store.lane_at(b, 0, -1).unwrap();
        assert_eq!(right_b.predecessors()[0].contact, ContactPoint::End);
    }

    #[test]
    fn relinking_is_idempotent() {
        let mut store = chained("start");
        let pass = LinkRoads::new(&[]);
        pass.execute(&mut store).unwrap();
        let a = store.key_of("A").unwrap();
        let first = store.lane_at(a, 1, -1).unwrap().successors().to_vec();
        pass.execute(&mut store).unwrap();
        assert_eq!(store.lane_at(a, 1, -1).unwrap().successors(), first.as_slice());
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn multiple_successors_fail() {
        let a = road_xml(
            "A",
            0.0,
            r#"<successor elementType="road" elementId="B" contactPoint="start"/>
               <successor elementType="road" elementId="B" contactPoint="end"/>"#,
            &section_xml(0.0, "", &lane_xml(-1, None, None)),
        );
        let b = road_xml("B", 10.0, "", &section_xml(0.0, "", &lane_xml(-1, None, None)));
        let mut store = store(&[a, b]).unwrap();
        let err = LinkRoads::new(&[]).execute(&mut store).unwrap_err();
        assert!(matches!(
            err,
            OdrError::Topology(TopologyError::MultipleLinks { kind: "successor", .. })
        ));
    }

    #[test]
    fn unknown_road_fails() {
        let a = road_xml(
            "A",
            0.0,
            r#"<predecessor elementType="road" elementId="Z" contactPoint="end"/>"#,
            &section_xml(0.0, "", &lane_xml(-1, None, None)),
        );
        let mut store = store(&[a]).unwrap();
        let err = LinkRoads::new(&[]).execute(&mut store).unwrap_err();
        assert!(matches!(err, OdrError::Topology(TopologyError::EntityNotFound(_))));
    }

    #[test]
    fn junction_links_are_kept_by_id() {
        let a = road_xml(
            "A",
            0.0,
            r#"<successor elementType="junction" elementId="J"/>"#,
            &section_xml(0.0, "", &lane_xml(-1, None, Some(-1))),
        );
        let mut store = store(&[a]).unwrap();
        LinkRoads::new(&[]).execute(&mut store).unwrap();
        let road = store.road_by_id("A").unwrap();
        assert_eq!(road.successor(), Some(&RoadLink::Junction { id: "J".into() }));
        assert!(road.sections()[0].successor().is_none());
    }
}
