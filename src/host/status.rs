use crate::operator::api::InfoTableSize;

/// A module broke the per-cook contract in a way the host could detect.
///
/// Violations never abort the cook: the previous texture stays on display and the violation is
/// reported through the node's status strings for that cook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractViolation {
    /// `upload_slot` was neither `-1` nor a slot index.
    UploadSlotOutOfRange(i32),
    /// `upload_slot` named a slot whose buffer the module still has checked out.
    UploadSlotNotResident(usize),
    /// General settings asked for a different mode than the one latched at the first cook.
    ModeChanged(String),
}

impl ContractViolation {
    /// Human-readable message.
    pub fn message(&self) -> String {
        match self {
            Self::UploadSlotOutOfRange(v) => format!(
                "invalid upload slot {v}: expected 0, 1, 2 or -1; previous texture retained"
            ),
            Self::UploadSlotNotResident(i) => format!(
                "upload slot {i} is checked out and was not restored; previous texture retained"
            ),
            Self::ModeChanged(msg) => msg.clone(),
        }
    }

    /// Errors go to the error string, everything else to the warning string.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::ModeChanged(_))
    }
}

/// Status strings of a node after its latest cook.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeStatus {
    /// Warning message, if the node is in a warning state.
    pub warning: Option<String>,
    /// Error message, if the node is in an error state.
    pub error: Option<String>,
    /// Info popup text.
    pub info_popup: Option<String>,
}

impl NodeStatus {
    /// Combine module-reported strings with host-detected violations.
    ///
    /// Empty module strings count as absent.
    pub(crate) fn collect(
        warning: Option<String>,
        error: Option<String>,
        info_popup: Option<String>,
        violations: &[ContractViolation],
    ) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = violations.iter().partition(|v| v.is_error());
        Self {
            warning: join(warning, &warnings),
            error: join(error, &errors),
            info_popup: non_empty(info_popup),
        }
    }

    /// `true` when neither a warning nor an error is set.
    pub fn is_clear(&self) -> bool {
        self.warning.is_none() && self.error.is_none()
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

fn join(module: Option<String>, host: &[&ContractViolation]) -> Option<String> {
    let parts: Vec<String> = host
        .iter()
        .map(|v| v.message())
        .chain(non_empty(module))
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

/// Tabular side-channel output of the latest cook, stored row-major.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct InfoTable {
    rows: usize,
    cols: usize,
    cells: Vec<String>,
}

impl InfoTable {
    pub(crate) fn new(size: InfoTableSize) -> Self {
        Self {
            rows: size.rows,
            cols: size.cols,
            cells: vec![String::new(); size.rows.saturating_mul(size.cols)],
        }
    }

    /// Store one fill call's entries at `index` according to the table orientation.
    pub(crate) fn put(&mut self, by_column: bool, index: usize, values: Vec<String>) {
        for (k, v) in values.into_iter().enumerate() {
            let (r, c) = if by_column { (k, index) } else { (index, k) };
            if r < self.rows && c < self.cols {
                self.cells[r * self.cols + c] = v;
            }
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        (row < self.rows && col < self.cols).then(|| self.cells[row * self.cols + col].as_str())
    }

    /// Row `row` as a slice.
    pub fn row(&self, row: usize) -> Option<&[String]> {
        (row < self.rows).then(|| &self.cells[row * self.cols..(row + 1) * self.cols])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/status.rs"]
mod tests;
