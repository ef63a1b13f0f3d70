// Fixed-capacity connection table: slot -> (connection, protocol session)
use ipkcp_core::Session;

/// Simultaneous stream clients the daemon tracks.
pub const MAX_CONNECTIONS: usize = 10;

pub struct Client<C> {
    pub connection: C,
    pub session: Session,
}

pub struct ConnectionTable<C> {
    slots: Vec<Option<Client<C>>>,
}

impl<C> ConnectionTable<C> {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CONNECTIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ConnectionTable {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Place a new connection, in `Init` state, into the lowest free slot.
    /// Hands the connection back when every slot is taken.
    pub fn insert(&mut self, connection: C) -> Result<usize, C> {
        match self.slots.iter().position(Option::is_none) {
            Some(slot) => {
                self.slots[slot] = Some(Client {
                    connection,
                    session: Session::new(),
                });
                Ok(slot)
            }
            None => Err(connection),
        }
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Client<C>> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, slot: usize) -> Option<Client<C>> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Client<C>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, client)| client.as_ref().map(|c| (slot, c)))
    }

    /// Empty every slot, yielding the occupants.
    pub fn drain(&mut self) -> impl Iterator<Item = (usize, Client<C>)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(slot, client)| client.take().map(|c| (slot, c)))
    }
}

impl<C> Default for ConnectionTable<C> {
    fn default() -> Self {
        Self::new()
    }
}
