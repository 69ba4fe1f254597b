/// Run one command against an aggregate in place: decide, then apply.
///
/// No store or bus is involved; `CommandDispatcher` in infra wraps the same
/// two steps with loading, appending and publishing.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: vitach_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
