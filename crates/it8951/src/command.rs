// IT8951 command, register and preamble definitions

// Bus preambles (first word of every transaction)
pub const PREAMBLE_COMMAND: u16 = 0x6000; // Command channel
pub const PREAMBLE_WRITE_DATA: u16 = 0x0000; // Data write channel
pub const PREAMBLE_READ_DATA: u16 = 0x1000; // Data read channel

// TCON commands
pub const SYS_RUN: u16 = 0x0001; // Leave standby/sleep
pub const STANDBY: u16 = 0x0002; // Standby
pub const SLEEP: u16 = 0x0003; // Sleep
pub const REG_RD: u16 = 0x0010; // Register read
pub const REG_WR: u16 = 0x0011; // Register write
pub const MEM_BST_RD_T: u16 = 0x0012; // Burst read trigger
pub const MEM_BST_RD_S: u16 = 0x0013; // Burst read start
pub const MEM_BST_WR: u16 = 0x0014; // Burst write
pub const MEM_BST_END: u16 = 0x0015; // End of burst
pub const LD_IMG: u16 = 0x0020; // Load full image
pub const LD_IMG_AREA: u16 = 0x0021; // Load image area
pub const LD_IMG_END: u16 = 0x0022; // End of image load

// I80 user defined commands
pub const DPY_AREA: u16 = 0x0034; // Display area
pub const DPY_BUF_AREA: u16 = 0x0037; // Display area from a given buffer address
pub const VCOM: u16 = 0x0039; // VCOM get/set
pub const GET_DEV_INFO: u16 = 0x0302; // Device information

// VCOM sub-commands
pub const VCOM_GET: u16 = 0x0000;
pub const VCOM_SET: u16 = 0x0001;

// Register bases
pub const DISPLAY_REG_BASE: u16 = 0x1000;
pub const SYS_REG_BASE: u16 = 0x0000;
pub const MCSR_BASE_ADDR: u16 = 0x0200;

// Registers
pub const I80CPCR: u16 = SYS_REG_BASE + 0x04; // I80 command packed mode
pub const LISAR: u16 = MCSR_BASE_ADDR + 0x0008; // Load image start address (low, +2 high)
pub const UP1SR: u16 = DISPLAY_REG_BASE + 0x138; // Update parameter 1 setting
pub const LUTAFSR: u16 = DISPLAY_REG_BASE + 0x224; // LUT engine status (non-zero = busy)
pub const BGVR: u16 = DISPLAY_REG_BASE + 0x250; // 1bpp color table

// Register values
pub const I80CPCR_PACKED: u16 = 0x0001; // Enable packed pixel writes
pub const UP1SR_1BPP: u16 = 1 << 2; // 1bpp mode bit in the high half of UP1SR

// Device info payload length in words
pub const DEV_INFO_WORDS: usize = 20;
