/// Where a column currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Membership {
    /// Basic, with its dictionary row
    Basic(usize),
    /// Nonbasic, with its position in the nonbasic set
    Nonbasic(usize),
}

/// Split of the working columns into basic and nonbasic variables.
///
/// Both sets are kept sorted ascending. Row `i` of the dictionary belongs to
/// `basic()[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    basic: Vec<usize>,
    nonbasic: Vec<usize>,
    membership: Vec<Membership>,
}

impl Partition {
    /// The trailing `num_basic` columns are basic, the rest nonbasic.
    pub fn slack_basis(num_columns: usize, num_basic: usize) -> Self {
        let split = num_columns - num_basic;
        let mut partition = Self {
            basic: (split..num_columns).collect(),
            nonbasic: (0..split).collect(),
            membership: Vec::new(),
        };
        partition.rebuild_membership();
        partition
    }

    pub fn basic(&self) -> &[usize] {
        &self.basic
    }

    pub fn nonbasic(&self) -> &[usize] {
        &self.nonbasic
    }

    pub fn num_columns(&self) -> usize {
        self.membership.len()
    }

    pub fn is_basic(&self, column: usize) -> bool {
        matches!(self.membership[column], Membership::Basic(_))
    }

    /// Dictionary row of a basic column.
    pub fn row_of(&self, column: usize) -> Option<usize> {
        match self.membership[column] {
            Membership::Basic(row) => Some(row),
            Membership::Nonbasic(_) => None,
        }
    }

    /// `entering` joins the basis and `leaving` exits it.
    ///
    /// Panics if `entering` is not nonbasic or `leaving` is not basic; the
    /// pivot rules only ever hand out such indices.
    pub fn exchange(&mut self, entering: usize, leaving: usize) {
        let Membership::Nonbasic(from) = self.membership[entering] else {
            panic!("column {entering} entering the basis is already basic");
        };
        let Membership::Basic(row) = self.membership[leaving] else {
            panic!("column {leaving} leaving the basis is not basic");
        };

        self.basic.remove(row);
        let to_row = self.basic.partition_point(|&j| j < entering);
        self.basic.insert(to_row, entering);

        self.nonbasic.remove(from);
        let to_pos = self.nonbasic.partition_point(|&j| j < leaving);
        self.nonbasic.insert(to_pos, leaving);

        // Only the slots between the old and new positions moved.
        for i in row.min(to_row)..=row.max(to_row) {
            self.membership[self.basic[i]] = Membership::Basic(i);
        }
        for i in from.min(to_pos)..=from.max(to_pos) {
            self.membership[self.nonbasic[i]] = Membership::Nonbasic(i);
        }
    }

    /// Partition over one extra leading column (the auxiliary variable of
    /// phase one), which starts out nonbasic. Every index shifts up by one.
    pub fn with_leading_column(&self) -> Self {
        let mut partition = Self {
            basic: self.basic.iter().map(|&j| j + 1).collect(),
            nonbasic: std::iter::once(0).chain(self.nonbasic.iter().map(|&j| j + 1)).collect(),
            membership: Vec::new(),
        };
        partition.rebuild_membership();
        partition
    }

    /// Inverse of [`Partition::with_leading_column`]. Column 0 must be nonbasic.
    pub fn without_leading_column(&self) -> Self {
        debug_assert!(!self.is_basic(0));
        let mut partition = Self {
            basic: self.basic.iter().map(|&j| j - 1).collect(),
            nonbasic: self.nonbasic.iter().filter(|&&j| j > 0).map(|&j| j - 1).collect(),
            membership: Vec::new(),
        };
        partition.rebuild_membership();
        partition
    }

    fn rebuild_membership(&mut self) {
        let mut membership = vec![Membership::Nonbasic(0); self.basic.len() + self.nonbasic.len()];
        for (row, &j) in self.basic.iter().enumerate() {
            membership[j] = Membership::Basic(row);
        }
        for (pos, &j) in self.nonbasic.iter().enumerate() {
            membership[j] = Membership::Nonbasic(pos);
        }
        self.membership = membership;
    }
}
